//! Local-file primitives for chunked uploads.
//!
//! Content hashing (the dedup key), deterministic chunk partitioning, and
//! random-access chunk reads.

mod chunk;
mod file;
mod hash;

pub use chunk::{ChunkReader, ChunkSpec, chunk_count, chunk_spec, chunk_specs};
pub use file::FileHandle;
pub use hash::{ContentHash, hash_bytes, hash_file};

/// Default chunk size: 10 MiB.
///
/// The server's chunk bookkeeping assumes every non-final chunk has exactly
/// this size, so it is part of the protocol contract, not just a tuning knob.
pub const DEFAULT_CHUNK_SIZE: u64 = 10 * 1024 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("range {offset}+{len} out of bounds for {file_size}-byte file")]
    OutOfRange { offset: u64, len: u64, file_size: u64 },

    #[error("file truncated: expected {expected} bytes at offset {offset}, got {got}")]
    Truncated { offset: u64, expected: u64, got: u64 },
}
