//! Remote execution engine clients.
//!
//! The effect platform runs transformations on a remote processing service
//! exposed through two structurally different REST APIs: direct workflow
//! execution and packaged-application execution. This crate provides one
//! adapter per engine behind a common [`adapter::Engine`] trait, the
//! dispatch router that picks an adapter from an effect's identifier, the
//! fallback coordinator that retries status/result/cancel queries against
//! the alternate engine, result payload normalization, and the submission
//! coordinator.

pub mod adapter;
pub mod endpoints;
pub mod fallback;
pub mod result;
pub mod router;
pub mod submit;
pub mod webapp;
pub mod workflow;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
