//! Error types for the upload pipeline.

use medialift_protocol::EnvelopeError;

/// A failed remote call.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Network-level failure: connection refused, timeout, TLS.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-success envelope or HTTP status.
    #[error("API error {code}: {message}")]
    Api { code: i32, message: String },

    /// The response body could not be decoded into the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The bearer token cannot be used in a request header.
    #[error("invalid bearer token")]
    InvalidToken,
}

impl From<EnvelopeError> for TransportError {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::Api { code, msg } => Self::Api { code, message: msg },
            EnvelopeError::MissingData => Self::InvalidResponse(err.to_string()),
        }
    }
}

/// Terminal errors surfaced by the orchestrator.
///
/// Chunk-level failures never appear here directly: they become
/// [`ChunkOutcome`](crate::ChunkOutcome) data inside the scheduler and only
/// surface as the aggregate [`ChunksFailed`](UploadError::ChunksFailed).
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("transfer error: {0}")]
    Transfer(#[from] medialift_transfer::TransferError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server response violated the upload contract.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// One or more chunks exhausted their retries. Carries every failed
    /// index so a re-run can cheaply request only the remaining subset.
    #[error("chunks failed after retries: {failed:?}")]
    ChunksFailed { failed: Vec<u32> },

    #[error("cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_api_error_maps_to_transport_api() {
        let err: TransportError = EnvelopeError::Api {
            code: 503,
            msg: "unavailable".into(),
        }
        .into();
        assert!(matches!(err, TransportError::Api { code: 503, .. }));
    }

    #[test]
    fn envelope_missing_data_maps_to_invalid_response() {
        let err: TransportError = EnvelopeError::MissingData.into();
        assert!(matches!(err, TransportError::InvalidResponse(_)));
    }

    #[test]
    fn chunks_failed_lists_indices() {
        let err = UploadError::ChunksFailed {
            failed: vec![2, 5],
        };
        let msg = err.to_string();
        assert!(msg.contains('2'));
        assert!(msg.contains('5'));
    }
}
