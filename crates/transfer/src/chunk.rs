use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::TransferError;

/// A fixed-size contiguous byte range of a file: the unit of transfer and
/// retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpec {
    pub index: u32,
    pub offset: u64,
    pub len: u64,
}

/// Number of chunks a file of `file_size` bytes splits into.
///
/// A zero-byte file has zero chunks.
pub fn chunk_count(file_size: u64, chunk_size: u64) -> u32 {
    file_size.div_ceil(chunk_size) as u32
}

/// The spec for a single chunk index, if that index exists for this file.
pub fn chunk_spec(index: u32, file_size: u64, chunk_size: u64) -> Option<ChunkSpec> {
    let offset = u64::from(index) * chunk_size;
    if offset >= file_size {
        return None;
    }
    Some(ChunkSpec {
        index,
        offset,
        len: chunk_size.min(file_size - offset),
    })
}

/// Derives the full chunk partition for a file.
///
/// The result covers `[0, file_size)` exactly: contiguous, non-overlapping,
/// with only the final chunk allowed to be short.
pub fn chunk_specs(file_size: u64, chunk_size: u64) -> Vec<ChunkSpec> {
    (0..chunk_count(file_size, chunk_size))
        .filter_map(|index| chunk_spec(index, file_size, chunk_size))
        .collect()
}

/// Random-access reader for chunk byte ranges.
///
/// Batches read chunks out of order across concurrent uploads, so every read
/// is addressed by offset instead of a cursor.
pub struct ChunkReader {
    file: std::fs::File,
    file_size: u64,
}

impl ChunkReader {
    /// Opens `path` for range reads, recording its current length.
    pub fn new(path: &Path) -> Result<Self, TransferError> {
        let file = std::fs::File::open(path)?;
        let file_size = file.metadata()?.len();
        Ok(Self { file, file_size })
    }

    /// Reads exactly `len` bytes starting at `offset`.
    ///
    /// Out-of-range requests and short reads (file shrank underneath us)
    /// surface as errors the caller can retry, never as panics.
    pub fn read_range(&mut self, offset: u64, len: u64) -> Result<Vec<u8>, TransferError> {
        let in_bounds = offset
            .checked_add(len)
            .is_some_and(|end| end <= self.file_size);
        if !in_bounds {
            return Err(TransferError::OutOfRange {
                offset,
                len,
                file_size: self.file_size,
            });
        }

        self.file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; len as usize];
        let mut filled = 0usize;
        while filled < buf.len() {
            let n = self.file.read(&mut buf[filled..])?;
            if n == 0 {
                return Err(TransferError::Truncated {
                    offset,
                    expected: len,
                    got: filled as u64,
                });
            }
            filled += n;
        }
        Ok(buf)
    }

    /// Reads the byte range described by `spec`.
    pub fn read_chunk(&mut self, spec: ChunkSpec) -> Result<Vec<u8>, TransferError> {
        self.read_range(spec.offset, spec.len)
    }

    /// File length captured at open time.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }
}
