use serde::{Deserialize, Serialize};

/// How the server wants content delivered after a presign check.
///
/// Numeric on the wire: `1` means the server already holds content matching
/// the hash, `2` means the content must be transferred. Any other value is
/// rejected at deserialization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum TransferType {
    /// Content already stored; the presign response carries the final URL.
    Instant,
    /// Content must be uploaded (chunked or single-shot).
    Chunked,
}

impl TryFrom<i32> for TransferType {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Instant),
            2 => Ok(Self::Chunked),
            other => Err(format!("unknown transfer type: {other}")),
        }
    }
}

impl From<TransferType> for i32 {
    fn from(value: TransferType) -> Self {
        match value {
            TransferType::Instant => 1,
            TransferType::Chunked => 2,
        }
    }
}
