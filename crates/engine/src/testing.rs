//! Scripted in-memory engines for tests.
//!
//! [`ScriptedEngine`] implements the [`Engine`] trait with queued canned
//! responses and call counters, so the fallback coordinator, poller, and
//! HTTP handlers can be exercised without a network. Enabled for this
//! crate's own unit tests and, via the `testing` feature, for dependent
//! crates' test suites.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use glint_core::status::TaskStatus;
use glint_core::template::ResolvedField;
use glint_core::types::{EngineKind, TaskId};

use crate::adapter::{Engine, EngineError, StatusReport};
use crate::result::ArtifactRef;
use crate::router::EngineRouter;

/// An [`Engine`] that replays queued responses.
///
/// Each operation pops from its own queue; when a queue runs dry the
/// engine falls back to a neutral default (`Pending` status, empty
/// outputs, successful cancel, failed start) so long poll loops can be
/// driven without queueing hundreds of entries.
pub struct ScriptedEngine {
    kind: EngineKind,
    starts: Mutex<VecDeque<Result<TaskId, EngineError>>>,
    statuses: Mutex<VecDeque<Result<StatusReport, EngineError>>>,
    outputs: Mutex<VecDeque<Result<Vec<ArtifactRef>, EngineError>>>,
    cancels: Mutex<VecDeque<Result<(), EngineError>>>,
    start_calls: AtomicU32,
    status_calls: AtomicU32,
    result_calls: AtomicU32,
    cancel_calls: AtomicU32,
    last_start: Mutex<Option<StartCall>>,
}

/// Arguments captured from the most recent `start` call.
#[derive(Debug, Clone)]
pub struct StartCall {
    pub region: String,
    pub identifier: String,
    pub invocation: Vec<ResolvedField>,
}

impl ScriptedEngine {
    pub fn new(kind: EngineKind) -> Self {
        Self {
            kind,
            starts: Mutex::new(VecDeque::new()),
            statuses: Mutex::new(VecDeque::new()),
            outputs: Mutex::new(VecDeque::new()),
            cancels: Mutex::new(VecDeque::new()),
            start_calls: AtomicU32::new(0),
            status_calls: AtomicU32::new(0),
            result_calls: AtomicU32::new(0),
            cancel_calls: AtomicU32::new(0),
            last_start: Mutex::new(None),
        }
    }

    pub fn queue_start(&self, response: Result<TaskId, EngineError>) {
        self.starts.lock().unwrap().push_back(response);
    }

    pub fn queue_status(&self, response: Result<StatusReport, EngineError>) {
        self.statuses.lock().unwrap().push_back(response);
    }

    pub fn queue_outputs(&self, response: Result<Vec<ArtifactRef>, EngineError>) {
        self.outputs.lock().unwrap().push_back(response);
    }

    pub fn queue_cancel(&self, response: Result<(), EngineError>) {
        self.cancels.lock().unwrap().push_back(response);
    }

    pub fn start_calls(&self) -> u32 {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn result_calls(&self) -> u32 {
        self.result_calls.load(Ordering::SeqCst)
    }

    pub fn cancel_calls(&self) -> u32 {
        self.cancel_calls.load(Ordering::SeqCst)
    }

    /// Arguments of the most recent `start` call, if any.
    pub fn last_start(&self) -> Option<StartCall> {
        self.last_start.lock().unwrap().clone()
    }
}

#[async_trait]
impl Engine for ScriptedEngine {
    fn kind(&self) -> EngineKind {
        self.kind
    }

    async fn start(
        &self,
        region: &str,
        identifier: &str,
        invocation: &[ResolvedField],
    ) -> Result<TaskId, EngineError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_start.lock().unwrap() = Some(StartCall {
            region: region.to_string(),
            identifier: identifier.to_string(),
            invocation: invocation.to_vec(),
        });
        self.starts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(EngineError::Unavailable("no scripted start response".into())))
    }

    async fn status(&self, _region: &str, _task_id: &str) -> Result<StatusReport, EngineError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(StatusReport {
                status: TaskStatus::Pending,
                raw: "QUEUED".to_string(),
            })
        })
    }

    async fn result(&self, _region: &str, _task_id: &str) -> Result<Vec<ArtifactRef>, EngineError> {
        self.result_calls.fetch_add(1, Ordering::SeqCst);
        self.outputs
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn cancel(&self, _region: &str, _task_id: &str) -> Result<(), EngineError> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        self.cancels
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

/// A router over two fresh scripted engines, returned together with
/// handles to script them.
pub fn scripted_router() -> (EngineRouter, Arc<ScriptedEngine>, Arc<ScriptedEngine>) {
    let workflow = Arc::new(ScriptedEngine::new(EngineKind::DirectWorkflow));
    let webapp = Arc::new(ScriptedEngine::new(EngineKind::PackagedApplication));
    let router = EngineRouter::new(
        Arc::clone(&workflow) as Arc<dyn Engine>,
        Arc::clone(&webapp) as Arc<dyn Engine>,
    );
    (router, workflow, webapp)
}
