//! Resumable content-addressed chunked upload core.
//!
//! This crate implements the **business logic** of the upload pipeline:
//! dedup check via content hash, batched concurrent chunk uploads with
//! per-chunk retry, durability reports, and server-side merge. It is a
//! library crate with no HTTP dependency — callers provide an
//! [`UploadTransport`] implementation (`medialift-api` has the reqwest one).
//!
//! # Pipeline
//!
//! 1. **Hash** — content digest of the local file
//! 2. **Presign** — dedup check + the chunk indices the server still needs
//! 3. **Upload** — fixed-size groups of concurrent chunk uploads, each chunk
//!    retried with linear backoff and confirmed with a report call
//! 4. **Merge** — server-side reassembly into the final object
//!
//! Files below the configured threshold skip chunking and use the
//! single-shot path with the same hash-based dedup contract.

pub mod chunk_uploader;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod scheduler;
pub mod task;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// Re-export primary types for convenience.
pub use chunk_uploader::{ChunkOutcome, ChunkUploader};
pub use config::UploaderConfig;
pub use error::{TransportError, UploadError};
pub use orchestrator::{
    Presigned, TransferKind, UploadEvent, UploadOrchestrator, UploadOutcome, UploadPhase,
};
pub use scheduler::BatchScheduler;
pub use task::UploadTask;
pub use transport::{TransportFuture, UploadTransport};
