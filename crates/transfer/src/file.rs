use std::path::{Path, PathBuf};

use crate::TransferError;

/// Reference to a local file queued for upload.
///
/// Size and name are captured once at open time and treated as immutable for
/// the whole upload attempt.
#[derive(Debug, Clone)]
pub struct FileHandle {
    path: PathBuf,
    size: u64,
    filename: String,
}

impl FileHandle {
    /// Opens a file reference, capturing its current size and name.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TransferError> {
        let path = path.as_ref().to_path_buf();
        let size = std::fs::metadata(&path)?.len();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        Ok(Self {
            path,
            size,
            filename,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}
