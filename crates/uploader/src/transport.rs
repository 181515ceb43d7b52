//! Transport trait for the remote upload API.
//!
//! The core consumes these calls and never implements them itself: the
//! `medialift-api` crate provides the HTTP client, and tests use recorded
//! mocks. A trait keeps upload logic decoupled from the wire.

use std::future::Future;
use std::pin::Pin;

use medialift_protocol::PresignResponse;
use medialift_transfer::ContentHash;

use crate::error::TransportError;

/// Boxed future returned by transport methods.
pub type TransportFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, TransportError>> + Send + 'a>>;

/// Remote calls the upload pipeline depends on.
///
/// `presign` is idempotent and hash-keyed: repeating it for the same content
/// returns the chunks the server still lacks, which is what makes re-runs
/// after partial failure cheap.
pub trait UploadTransport: Send + Sync {
    /// Asks the server how to transfer chunked content with the given hash.
    fn presign(
        &self,
        file_hash: &ContentHash,
        total_chunks: u32,
        filename: &str,
    ) -> TransportFuture<'_, PresignResponse>;

    /// Transfers one chunk's raw bytes, tagged with hash and index.
    fn upload_chunk(
        &self,
        file_hash: &ContentHash,
        chunk_index: u32,
        data: Vec<u8>,
    ) -> TransportFuture<'_, ()>;

    /// Confirms durable storage of a chunk, decoupled from the raw transfer.
    fn report_chunk(&self, file_hash: &ContentHash, chunk_index: u32) -> TransportFuture<'_, ()>;

    /// Triggers server-side reassembly; returns the public URL.
    fn merge_chunks(
        &self,
        file_hash: &ContentHash,
        filename: &str,
    ) -> TransportFuture<'_, String>;

    /// Dedup check for the single-shot path.
    fn presign_single(
        &self,
        file_hash: &ContentHash,
        filename: &str,
    ) -> TransportFuture<'_, PresignResponse>;

    /// Uploads a whole small file in one call; returns the public URL.
    fn upload_single(
        &self,
        file_hash: &ContentHash,
        filename: &str,
        data: Vec<u8>,
    ) -> TransportFuture<'_, String>;
}
