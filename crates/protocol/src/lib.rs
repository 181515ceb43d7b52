//! Wire types for the upload API.
//!
//! Request and response payloads exchanged with the upload service, the
//! `{code, data, msg}` response envelope every endpoint wraps its answer in,
//! and the transfer-type contract used for content-addressed dedup.

pub mod envelope;
pub mod messages;
pub mod types;

pub use envelope::{ApiEnvelope, EnvelopeError, SUCCESS_CODE};
pub use messages::{
    MergeChunksRequest, PresignChunkRequest, PresignResponse, PresignSingleRequest,
    ReportChunkRequest, SingleUploadData,
};
pub use types::TransferType;
