//! End-to-end upload of a single chunk with bounded retry.

use std::path::{Path, PathBuf};

use medialift_transfer::{ChunkReader, ChunkSpec, ContentHash};
use tracing::{debug, warn};

use crate::config::UploaderConfig;
use crate::error::UploadError;
use crate::transport::UploadTransport;

/// Result of one chunk's full retry cycle.
///
/// Failures never escape the uploader as raised errors; the scheduler
/// collects outcomes after each group joins.
#[derive(Debug)]
pub enum ChunkOutcome {
    Succeeded,
    /// Every attempt failed; carries the final attempt's error.
    Failed(UploadError),
}

impl ChunkOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Uploads single chunks: fresh range read, transfer, report, with linear
/// backoff between attempts.
pub struct ChunkUploader<'a> {
    transport: &'a dyn UploadTransport,
    path: PathBuf,
    file_hash: &'a ContentHash,
    config: &'a UploaderConfig,
}

impl<'a> ChunkUploader<'a> {
    pub fn new(
        transport: &'a dyn UploadTransport,
        path: &Path,
        file_hash: &'a ContentHash,
        config: &'a UploaderConfig,
    ) -> Self {
        Self {
            transport,
            path: path.to_path_buf(),
            file_hash,
            config,
        }
    }

    /// Runs up to `retry_attempts` attempts for one chunk.
    ///
    /// Each attempt re-reads the byte range from disk instead of reusing a
    /// prior attempt's buffer, then requires both the upload and the report
    /// call to succeed. Sleeps `attempt * retry_base_delay` between attempts,
    /// never after the last one.
    pub async fn upload(&self, spec: ChunkSpec) -> ChunkOutcome {
        let attempts = self.config.retry_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.try_upload(spec).await {
                Ok(()) => {
                    if attempt > 1 {
                        debug!(chunk = spec.index, attempt, "chunk uploaded after retry");
                    }
                    return ChunkOutcome::Succeeded;
                }
                Err(e) => {
                    warn!(chunk = spec.index, attempt, error = %e, "chunk attempt failed");
                    if attempt >= attempts {
                        return ChunkOutcome::Failed(e);
                    }
                    tokio::time::sleep(self.config.retry_delay(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One attempt: read, upload, report.
    async fn try_upload(&self, spec: ChunkSpec) -> Result<(), UploadError> {
        let data = read_chunk(self.path.clone(), spec).await?;
        self.transport
            .upload_chunk(self.file_hash, spec.index, data)
            .await?;
        self.transport
            .report_chunk(self.file_hash, spec.index)
            .await?;
        Ok(())
    }
}

/// Reads a chunk range on the blocking pool; every call opens its own reader.
async fn read_chunk(path: PathBuf, spec: ChunkSpec) -> Result<Vec<u8>, UploadError> {
    let data = tokio::task::spawn_blocking(move || {
        let mut reader = ChunkReader::new(&path)?;
        reader.read_chunk(spec)
    })
    .await
    .map_err(|e| {
        UploadError::Transfer(std::io::Error::other(format!("task join error: {e}")).into())
    })??;
    Ok(data)
}
