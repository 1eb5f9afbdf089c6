//! HTTP surface for the effect task platform.
//!
//! Exposes submission, status, result, and cancel endpoints over the task
//! runtime, plus a health check. The binary in `main.rs` wires
//! configuration, the engine adapters, and the task manager together;
//! integration tests build the same router over scripted engines.

pub mod config;
pub mod error;
pub mod router;
pub mod routes;
pub mod state;
