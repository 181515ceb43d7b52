//! Presentation-agnostic handle for a running upload.
//!
//! [`UploadTask`] runs an [`UploadOrchestrator`] on the tokio runtime and
//! exposes its progress as pollable/subscribable state, so any frontend can
//! observe the upload without being woven into its control flow.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use medialift_transfer::FileHandle;

use crate::error::UploadError;
use crate::orchestrator::{UploadEvent, UploadOrchestrator, UploadOutcome, UploadPhase};

/// A running upload with observable terminal state.
pub struct UploadTask {
    phase_rx: watch::Receiver<UploadPhase>,
    events_rx: Option<mpsc::Receiver<UploadEvent>>,
    cancel: CancellationToken,
    handle: JoinHandle<Result<UploadOutcome, UploadError>>,
}

impl UploadTask {
    /// Spawns the upload and begins tracking its phase.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(mut orchestrator: UploadOrchestrator, file: FileHandle) -> Self {
        let (phase_tx, phase_rx) = watch::channel(UploadPhase::Idle);
        let (out_tx, out_rx) = mpsc::channel(256);
        let cancel = orchestrator.cancel_token();

        if let Some(mut events) = orchestrator.take_events() {
            tokio::spawn(async move {
                while let Some(event) = events.recv().await {
                    match &event {
                        UploadEvent::PhaseChanged(phase) => {
                            let _ = phase_tx.send(phase.clone());
                        }
                        UploadEvent::ChunkUploaded {
                            completed, total, ..
                        } => {
                            let _ = phase_tx.send(UploadPhase::Uploading {
                                completed: *completed,
                                total: *total,
                            });
                        }
                        UploadEvent::Completed { .. } => {
                            let _ = phase_tx.send(UploadPhase::Done);
                        }
                        UploadEvent::Failed { .. } => {
                            let _ = phase_tx.send(UploadPhase::Failed);
                        }
                    }
                    // Event delivery to subscribers is best-effort; the
                    // terminal result travels through the join handle.
                    if out_tx.try_send(event).is_err() {
                        trace!("upload event dropped: subscriber not keeping up");
                    }
                }
            });
        }

        let handle = tokio::spawn(async move { orchestrator.upload(&file).await });

        Self {
            phase_rx,
            events_rx: Some(out_rx),
            cancel,
            handle,
        }
    }

    /// Current phase snapshot.
    pub fn phase(&self) -> UploadPhase {
        self.phase_rx.borrow().clone()
    }

    /// Subscribes to phase updates.
    pub fn subscribe(&self) -> watch::Receiver<UploadPhase> {
        self.phase_rx.clone()
    }

    /// Takes the event stream. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<UploadEvent>> {
        self.events_rx.take()
    }

    /// Requests cancellation; takes effect at the next batch-group boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns `true` once the upload has reached its terminal result.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Awaits the terminal result.
    pub async fn wait(self) -> Result<UploadOutcome, UploadError> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(UploadError::Transfer(
                std::io::Error::other(format!("task join error: {e}")).into(),
            )),
        }
    }
}
