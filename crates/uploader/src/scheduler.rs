//! Batch-synchronous bounded-concurrency chunk scheduling.

use futures_util::future::join_all;
use medialift_transfer::{ChunkSpec, ContentHash, FileHandle};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::chunk_uploader::{ChunkOutcome, ChunkUploader};
use crate::config::UploaderConfig;
use crate::error::UploadError;
use crate::orchestrator::UploadEvent;
use crate::transport::UploadTransport;

/// Drives chunk uploads in fixed-size concurrent groups.
///
/// Groups execute strictly in index order, and every upload in a group is
/// joined before the next group starts, which bounds peak memory and open
/// sockets to one group's worth.
pub struct BatchScheduler<'a> {
    transport: &'a dyn UploadTransport,
    config: &'a UploaderConfig,
    cancel: &'a CancellationToken,
}

impl<'a> BatchScheduler<'a> {
    pub fn new(
        transport: &'a dyn UploadTransport,
        config: &'a UploaderConfig,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            transport,
            config,
            cancel,
        }
    }

    /// Uploads every chunk in `specs`, returning the indices that failed.
    ///
    /// Runs to completion regardless of failures, so a single pass makes as
    /// much progress as it can; a failing chunk never cancels or blocks the
    /// siblings in its group. Cancellation is honored only between groups:
    /// the in-flight group finishes and the remaining groups are skipped.
    pub async fn run(
        &self,
        file: &FileHandle,
        file_hash: &ContentHash,
        specs: &[ChunkSpec],
        events_tx: &mpsc::Sender<UploadEvent>,
    ) -> Result<Vec<u32>, UploadError> {
        let uploader = ChunkUploader::new(self.transport, file.path(), file_hash, self.config);
        let total = specs.len();
        let mut failed = Vec::new();
        let mut completed = 0usize;

        let group_size = self.config.batch_concurrency.max(1);
        for group in specs.chunks(group_size) {
            if self.cancel.is_cancelled() {
                debug!(completed, total, "cancelled at group boundary");
                return Err(UploadError::Cancelled);
            }

            debug!(
                first = group[0].index,
                len = group.len(),
                "starting chunk group"
            );
            let outcomes = join_all(group.iter().map(|spec| uploader.upload(*spec))).await;

            for (spec, outcome) in group.iter().zip(outcomes) {
                match outcome {
                    ChunkOutcome::Succeeded => {
                        completed += 1;
                        let _ = events_tx
                            .send(UploadEvent::ChunkUploaded {
                                index: spec.index,
                                completed,
                                total,
                            })
                            .await;
                    }
                    ChunkOutcome::Failed(e) => {
                        warn!(chunk = spec.index, error = %e, "chunk failed after retries");
                        failed.push(spec.index);
                    }
                }
            }
        }

        Ok(failed)
    }
}
