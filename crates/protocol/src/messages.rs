use serde::{Deserialize, Serialize};

use crate::types::TransferType;

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Asks the server how to transfer chunked content with the given hash.
///
/// Idempotent and hash-keyed: repeating the call for the same content returns
/// the chunks the server still lacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignChunkRequest {
    pub file_hash: String,
    pub total_chunks: u32,
    pub filename: String,
}

/// Dedup check for the single-shot upload path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignSingleRequest {
    pub filename: String,
    pub file_hash: String,
}

/// Confirms durable storage of one chunk, decoupled from the raw transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportChunkRequest {
    pub file_hash: String,
    pub chunk_index: u32,
}

/// Triggers server-side reassembly of all chunks for a hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeChunksRequest {
    pub file_hash: String,
    pub filename: String,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Server's answer to either presign request.
///
/// The optional fields are only meaningful for their transfer type:
/// `file_url` for [`TransferType::Instant`], the chunk index lists for
/// [`TransferType::Chunked`]. The uploader validates this loose shape into a
/// closed value before acting on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    pub transfer_type: TransferType,
    /// Chunk indices the server already holds for this hash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_chunks: Option<Vec<u32>>,
    /// Chunk indices the server still needs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub need_upload_chunks: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file_url: String,
}

/// Payload of a completed single-shot upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleUploadData {
    pub url: String,
}
