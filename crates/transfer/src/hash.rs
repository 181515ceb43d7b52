use std::fmt;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::TransferError;

/// Hex-encoded SHA-256 digest of a file's full contents.
///
/// The server keys chunk bookkeeping and dedup lookups on this value. It is
/// computed once per upload attempt and reused verbatim on every call of that
/// attempt: presign, each chunk, and merge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes the content hash of an in-memory buffer.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    ContentHash(hex::encode(hasher.finalize()))
}

/// Computes the content hash of an entire file without loading it whole.
pub fn hash_file(path: &Path) -> Result<ContentHash, TransferError> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(ContentHash(hex::encode(hasher.finalize())))
}
