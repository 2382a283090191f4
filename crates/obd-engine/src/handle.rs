//! Engine Handle
//!
//! The engine runs on its own task and owns all protocol state; callers
//! hold a cheap cloneable handle. Requests travel over a bounded mpsc
//! channel, so overlapping callers queue FIFO and each one gets its own
//! reply. A full queue rejects the request instead of dropping an earlier
//! caller's continuation.

use crate::engine::CommandEngine;
use crate::error::EngineError;
use crate::transport::Transport;
use obd_protocol::{Command, DtcCode, Pid};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

/// Default depth of the request queue
pub const DEFAULT_QUEUE_DEPTH: usize = 16;

enum EngineRequest {
    Command(Command, oneshot::Sender<Result<String, EngineError>>),
    Query(Pid, oneshot::Sender<Result<f64, EngineError>>),
    ReadDtcs(oneshot::Sender<Vec<DtcCode>>),
    ClearDtcs(oneshot::Sender<bool>),
}

/// Cloneable handle to a spawned [`CommandEngine`]
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineRequest>,
}

/// Spawn an engine task with the default queue depth
pub fn spawn<T: Transport + 'static>(
    engine: CommandEngine<T>,
) -> (EngineHandle, JoinHandle<()>) {
    spawn_with_queue_depth(engine, DEFAULT_QUEUE_DEPTH)
}

/// Spawn an engine task behind a bounded FIFO queue of the given depth
pub fn spawn_with_queue_depth<T: Transport + 'static>(
    mut engine: CommandEngine<T>,
    depth: usize,
) -> (EngineHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel(depth);

    let task = tokio::spawn(async move {
        while let Some(request) = rx.recv().await {
            match request {
                EngineRequest::Command(command, reply) => {
                    let _ = reply.send(engine.send_command(&command).await);
                }
                EngineRequest::Query(pid, reply) => {
                    let _ = reply.send(engine.query_pid(pid).await);
                }
                EngineRequest::ReadDtcs(reply) => {
                    let _ = reply.send(engine.read_dtcs().await);
                }
                EngineRequest::ClearDtcs(reply) => {
                    let _ = reply.send(engine.clear_dtcs().await);
                }
            }
        }
        debug!("engine task stopped");
    });

    (EngineHandle { tx }, task)
}

impl EngineHandle {
    #[cfg(test)]
    fn for_test(tx: mpsc::Sender<EngineRequest>) -> Self {
        Self { tx }
    }

    fn enqueue(&self, request: EngineRequest) -> Result<(), EngineError> {
        self.tx.try_send(request).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => EngineError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => EngineError::Disconnected,
        })
    }

    /// Send one command and await its framed reply
    pub async fn send_command(&self, command: Command) -> Result<String, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.enqueue(EngineRequest::Command(command, tx))?;
        rx.await.map_err(|_| EngineError::Disconnected)?
    }

    /// Query one PID and decode its reply
    pub async fn query(&self, pid: Pid) -> Result<f64, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.enqueue(EngineRequest::Query(pid, tx))?;
        rx.await.map_err(|_| EngineError::Disconnected)?
    }

    /// Read stored trouble codes; any failure yields an empty list
    pub async fn read_dtcs(&self) -> Vec<DtcCode> {
        let (tx, rx) = oneshot::channel();
        if self.enqueue(EngineRequest::ReadDtcs(tx)).is_err() {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }

    /// Clear stored trouble codes; true iff the adapter replied
    pub async fn clear_dtcs(&self) -> bool {
        let (tx, rx) = oneshot::channel();
        if self.enqueue(EngineRequest::ClearDtcs(tx)).is_err() {
            return false;
        }
        rx.await.unwrap_or(false)
    }
}
