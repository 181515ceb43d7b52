//! Top-level upload state machine.
//!
//! Drives one file from content hash to final URL:
//! hash → presign → (instant | chunked batches → merge) with the single-shot
//! path for files under the chunking threshold.

use std::sync::Arc;

use medialift_protocol::{PresignResponse, TransferType};
use medialift_transfer::{ContentHash, FileHandle, chunk_count, chunk_spec, hash_file};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::UploaderConfig;
use crate::error::UploadError;
use crate::scheduler::BatchScheduler;
use crate::transport::UploadTransport;

/// Observable pipeline phase.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    Hashing,
    Presigning,
    Uploading {
        completed: usize,
        total: usize,
    },
    Merging,
    Done,
    Failed,
}

/// Events emitted while an upload runs.
#[derive(Debug, Clone)]
pub enum UploadEvent {
    /// The pipeline entered a new phase.
    PhaseChanged(UploadPhase),
    /// A chunk was transferred and confirmed.
    ChunkUploaded {
        index: u32,
        completed: usize,
        total: usize,
    },
    /// Terminal success with the remote URL.
    Completed { url: String },
    /// Terminal failure.
    Failed { error: String },
}

/// Which path produced the final URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    /// Server already held the content; nothing was uploaded.
    Instant,
    /// Chunked batches plus a merge call.
    Chunked,
    /// One-call upload for files under the chunking threshold.
    SingleShot,
}

/// Terminal value of a successful upload.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub url: String,
    pub kind: TransferKind,
}

/// Closed, validated form of the server's presign answer.
///
/// [`PresignResponse`] keeps the wire's loose optional fields; everything
/// past the presign step sees only this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presigned {
    /// Server already holds the content at `url`.
    Instant { url: String },
    /// Server lists the chunk indices it still needs.
    Chunked { needed: Vec<u32> },
}

/// Validates a presign response into a [`Presigned`] value.
///
/// A chunked answer without a needed-chunk list is a contract violation and
/// fails here rather than defaulting to uploading everything.
pub fn validate_presign(resp: PresignResponse) -> Result<Presigned, UploadError> {
    match resp.transfer_type {
        TransferType::Instant => {
            if resp.file_url.is_empty() {
                return Err(UploadError::Protocol(
                    "instant transfer without a file URL".into(),
                ));
            }
            Ok(Presigned::Instant { url: resp.file_url })
        }
        TransferType::Chunked => match resp.need_upload_chunks {
            Some(needed) => Ok(Presigned::Chunked { needed }),
            None => Err(UploadError::Protocol(
                "chunked transfer without a needed-chunk list".into(),
            )),
        },
    }
}

/// Orchestrates the upload of one file at a time.
///
/// Owns the event channel and cancellation token; the actual remote calls go
/// through the injected [`UploadTransport`]. Retries happen only inside the
/// chunk uploader; a failed run is restarted by calling [`upload`] again,
/// and the hash-keyed presign then returns only the missing chunks.
///
/// [`upload`]: UploadOrchestrator::upload
pub struct UploadOrchestrator {
    transport: Arc<dyn UploadTransport>,
    config: UploaderConfig,
    events_tx: mpsc::Sender<UploadEvent>,
    events_rx: Option<mpsc::Receiver<UploadEvent>>,
    cancel: CancellationToken,
}

impl UploadOrchestrator {
    pub fn new(transport: Arc<dyn UploadTransport>, config: UploaderConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel(256);
        Self {
            transport,
            config,
            events_tx,
            events_rx: Some(events_rx),
            cancel: CancellationToken::new(),
        }
    }

    /// Takes the event receiver. Can only be called once.
    ///
    /// Long uploads emit one event per chunk; consume the stream (or leave it
    /// untaken and drop the receiver) so the bounded channel never fills.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<UploadEvent>> {
        self.events_rx.take()
    }

    /// Returns the cancellation token for this upload.
    ///
    /// Cancellation takes effect at batch-group boundaries only; dispatched
    /// chunks always run to completion.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    /// Runs the upload pipeline for one file to its terminal result.
    pub async fn upload(&self, file: &FileHandle) -> Result<UploadOutcome, UploadError> {
        let result = self.run(file).await;
        match &result {
            Ok(outcome) => {
                info!(file = %file.filename(), kind = ?outcome.kind, url = %outcome.url, "upload complete");
                let _ = self
                    .events_tx
                    .send(UploadEvent::Completed {
                        url: outcome.url.clone(),
                    })
                    .await;
            }
            Err(e) => {
                error!(file = %file.filename(), error = %e, "upload failed");
                let _ = self
                    .events_tx
                    .send(UploadEvent::Failed {
                        error: e.to_string(),
                    })
                    .await;
            }
        }
        result
    }

    async fn run(&self, file: &FileHandle) -> Result<UploadOutcome, UploadError> {
        if self.cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }

        if file.size() > self.config.instant_transfer_size_threshold {
            self.run_chunked(file).await
        } else {
            self.run_single_shot(file).await
        }
    }

    /// Chunked pipeline: hash, presign, batch upload, merge.
    async fn run_chunked(&self, file: &FileHandle) -> Result<UploadOutcome, UploadError> {
        self.set_phase(UploadPhase::Hashing).await;
        let file_hash = self.hash(file).await?;

        self.set_phase(UploadPhase::Presigning).await;
        let chunk_size = self.config.effective_chunk_size();
        let total_chunks = chunk_count(file.size(), chunk_size);
        let presign = self
            .transport
            .presign(&file_hash, total_chunks, file.filename())
            .await?;

        let needed = match validate_presign(presign)? {
            Presigned::Instant { url } => {
                debug!(hash = %file_hash, "content already stored, instant transfer");
                return Ok(UploadOutcome {
                    url,
                    kind: TransferKind::Instant,
                });
            }
            Presigned::Chunked { needed } => needed,
        };

        let mut specs = Vec::with_capacity(needed.len());
        for index in &needed {
            match chunk_spec(*index, file.size(), chunk_size) {
                Some(spec) => specs.push(spec),
                None => {
                    return Err(UploadError::Protocol(format!(
                        "needed chunk {index} out of range (total {total_chunks})"
                    )));
                }
            }
        }

        self.set_phase(UploadPhase::Uploading {
            completed: 0,
            total: specs.len(),
        })
        .await;
        info!(
            hash = %file_hash,
            needed = specs.len(),
            total = total_chunks,
            "uploading chunks"
        );

        let scheduler = BatchScheduler::new(self.transport.as_ref(), &self.config, &self.cancel);
        let failed = scheduler
            .run(file, &file_hash, &specs, &self.events_tx)
            .await?;

        if !failed.is_empty() {
            // Merge must never run with chunks missing.
            return Err(UploadError::ChunksFailed { failed });
        }

        self.set_phase(UploadPhase::Merging).await;
        let url = self
            .transport
            .merge_chunks(&file_hash, file.filename())
            .await?;
        Ok(UploadOutcome {
            url,
            kind: TransferKind::Chunked,
        })
    }

    /// Single-shot pipeline for files under the chunking threshold, sharing
    /// the hash-based dedup contract.
    async fn run_single_shot(&self, file: &FileHandle) -> Result<UploadOutcome, UploadError> {
        self.set_phase(UploadPhase::Hashing).await;
        let file_hash = self.hash(file).await?;

        self.set_phase(UploadPhase::Presigning).await;
        let presign = self
            .transport
            .presign_single(&file_hash, file.filename())
            .await?;

        if presign.transfer_type == TransferType::Instant {
            if presign.file_url.is_empty() {
                return Err(UploadError::Protocol(
                    "instant transfer without a file URL".into(),
                ));
            }
            debug!(hash = %file_hash, "content already stored, instant transfer");
            return Ok(UploadOutcome {
                url: presign.file_url,
                kind: TransferKind::Instant,
            });
        }

        self.set_phase(UploadPhase::Uploading {
            completed: 0,
            total: 1,
        })
        .await;
        let path = file.path().to_path_buf();
        let data = tokio::task::spawn_blocking(move || std::fs::read(&path))
            .await
            .map_err(|e| {
                UploadError::Transfer(
                    std::io::Error::other(format!("task join error: {e}")).into(),
                )
            })?
            .map_err(medialift_transfer::TransferError::from)?;

        let url = self
            .transport
            .upload_single(&file_hash, file.filename(), data)
            .await?;
        Ok(UploadOutcome {
            url,
            kind: TransferKind::SingleShot,
        })
    }

    async fn hash(&self, file: &FileHandle) -> Result<ContentHash, UploadError> {
        let path = file.path().to_path_buf();
        let hash = tokio::task::spawn_blocking(move || hash_file(&path))
            .await
            .map_err(|e| {
                UploadError::Transfer(
                    std::io::Error::other(format!("task join error: {e}")).into(),
                )
            })??;
        Ok(hash)
    }

    async fn set_phase(&self, phase: UploadPhase) {
        let _ = self
            .events_tx
            .send(UploadEvent::PhaseChanged(phase))
            .await;
    }
}
