//! Upload pipeline configuration.

use std::time::Duration;

use medialift_transfer::DEFAULT_CHUNK_SIZE;
use serde::{Deserialize, Serialize};

/// Tuning knobs for the upload pipeline, passed to the orchestrator at
/// construction.
///
/// `chunk_size` must match what the server's merge step expects; the other
/// fields are client-side policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploaderConfig {
    /// Size of every non-final chunk, in bytes. 0 means the default.
    pub chunk_size: u64,
    /// Chunks uploaded concurrently per batch group.
    pub batch_concurrency: usize,
    /// Attempts per chunk before it counts as failed.
    pub retry_attempts: u32,
    /// Base for the linear retry backoff, in milliseconds.
    pub retry_base_delay_ms: u64,
    /// Files at or below this size skip chunking and upload in one call,
    /// still going through the hash-based dedup check.
    pub instant_transfer_size_threshold: u64,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            batch_concurrency: 3,
            retry_attempts: 3,
            retry_base_delay_ms: 500,
            instant_transfer_size_threshold: 50 * 1024 * 1024,
        }
    }
}

impl UploaderConfig {
    /// Delay before retrying after a failed `attempt` (1-based).
    ///
    /// Linear: `attempt * base`.
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms.saturating_mul(u64::from(attempt)))
    }

    /// Chunk size with the zero-means-default rule applied.
    pub fn effective_chunk_size(&self) -> u64 {
        if self.chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            self.chunk_size
        }
    }
}
