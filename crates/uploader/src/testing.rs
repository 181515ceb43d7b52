//! Shared test doubles for the upload pipeline.
//!
//! `MockTransport` records every call and serves scripted responses, so tests
//! can assert on exact call sequences and injected failures.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use medialift_protocol::{PresignResponse, TransferType};
use medialift_transfer::ContentHash;

use crate::error::TransportError;
use crate::transport::{TransportFuture, UploadTransport};

/// A recorded transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Presign {
        hash: String,
        total_chunks: u32,
        filename: String,
    },
    UploadChunk {
        index: u32,
        len: usize,
    },
    ReportChunk {
        index: u32,
    },
    MergeChunks {
        filename: String,
    },
    PresignSingle {
        filename: String,
    },
    UploadSingle {
        len: usize,
    },
}

type UploadHook = Box<dyn Fn(u32) + Send + Sync>;

/// Scripted [`UploadTransport`] that records every call.
pub(crate) struct MockTransport {
    calls: Mutex<Vec<Call>>,
    presign_responses: Mutex<Vec<Result<PresignResponse, TransportError>>>,
    merge_results: Mutex<Vec<Result<String, TransportError>>>,
    single_results: Mutex<Vec<Result<String, TransportError>>>,
    /// chunk index -> remaining upload attempts to fail.
    chunk_failures: Mutex<HashMap<u32, u32>>,
    /// chunk index -> remaining report attempts to fail.
    report_failures: Mutex<HashMap<u32, u32>>,
    /// Invoked as each chunk upload completes (lets tests trigger
    /// cancellation at a precise point).
    on_upload_chunk: Mutex<Option<UploadHook>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            presign_responses: Mutex::new(Vec::new()),
            merge_results: Mutex::new(Vec::new()),
            single_results: Mutex::new(Vec::new()),
            chunk_failures: Mutex::new(HashMap::new()),
            report_failures: Mutex::new(HashMap::new()),
            on_upload_chunk: Mutex::new(None),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// An instant-transfer presign answer.
    pub fn instant(url: &str) -> PresignResponse {
        PresignResponse {
            transfer_type: TransferType::Instant,
            uploaded_chunks: None,
            need_upload_chunks: None,
            file_url: url.to_string(),
        }
    }

    /// A chunked-transfer presign answer listing the needed indices.
    pub fn chunked(needed: &[u32]) -> PresignResponse {
        PresignResponse {
            transfer_type: TransferType::Chunked,
            uploaded_chunks: None,
            need_upload_chunks: Some(needed.to_vec()),
            file_url: String::new(),
        }
    }

    pub fn push_presign(&self, resp: PresignResponse) {
        self.presign_responses.lock().unwrap().push(Ok(resp));
    }

    pub fn push_presign_err(&self, err: TransportError) {
        self.presign_responses.lock().unwrap().push(Err(err));
    }

    pub fn push_merge(&self, result: Result<String, TransportError>) {
        self.merge_results.lock().unwrap().push(result);
    }

    /// Makes the next `times` upload attempts for `index` fail.
    pub fn fail_chunk(&self, index: u32, times: u32) {
        self.chunk_failures.lock().unwrap().insert(index, times);
    }

    /// Makes the next `times` report attempts for `index` fail.
    pub fn fail_report(&self, index: u32, times: u32) {
        self.report_failures.lock().unwrap().insert(index, times);
    }

    pub fn set_upload_hook(&self, hook: impl Fn(u32) + Send + Sync + 'static) {
        *self.on_upload_chunk.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Indices of every `upload_chunk` call, in invocation order.
    pub fn upload_indices(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::UploadChunk { index, .. } => Some(index),
                _ => None,
            })
            .collect()
    }

    pub fn report_count(&self, index: u32) -> usize {
        self.calls()
            .into_iter()
            .filter(|c| *c == Call::ReportChunk { index })
            .count()
    }

    pub fn merge_count(&self) -> usize {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::MergeChunks { .. }))
            .count()
    }

    /// Peak number of concurrently in-flight `upload_chunk` calls.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn take_failure(failures: &Mutex<HashMap<u32, u32>>, index: u32) -> bool {
        let mut map = failures.lock().unwrap();
        match map.get_mut(&index) {
            Some(remaining) if *remaining > 0 => {
                *remaining = remaining.saturating_sub(1);
                true
            }
            _ => false,
        }
    }
}

impl UploadTransport for MockTransport {
    fn presign(
        &self,
        file_hash: &ContentHash,
        total_chunks: u32,
        filename: &str,
    ) -> TransportFuture<'_, PresignResponse> {
        self.record(Call::Presign {
            hash: file_hash.as_str().to_string(),
            total_chunks,
            filename: filename.to_string(),
        });
        Box::pin(async move {
            let mut responses = self.presign_responses.lock().unwrap();
            if responses.is_empty() {
                Err(TransportError::Network("no scripted presign response".into()))
            } else {
                responses.remove(0)
            }
        })
    }

    fn upload_chunk(
        &self,
        _file_hash: &ContentHash,
        chunk_index: u32,
        data: Vec<u8>,
    ) -> TransportFuture<'_, ()> {
        self.record(Call::UploadChunk {
            index: chunk_index,
            len: data.len(),
        });
        Box::pin(async move {
            let n = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(n, Ordering::SeqCst);
            // Parks the future so group siblings genuinely overlap.
            tokio::time::sleep(Duration::from_millis(2)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if let Some(hook) = self.on_upload_chunk.lock().unwrap().as_ref() {
                hook(chunk_index);
            }

            if Self::take_failure(&self.chunk_failures, chunk_index) {
                Err(TransportError::Network(format!(
                    "injected failure for chunk {chunk_index}"
                )))
            } else {
                Ok(())
            }
        })
    }

    fn report_chunk(
        &self,
        _file_hash: &ContentHash,
        chunk_index: u32,
    ) -> TransportFuture<'_, ()> {
        self.record(Call::ReportChunk { index: chunk_index });
        Box::pin(async move {
            if Self::take_failure(&self.report_failures, chunk_index) {
                Err(TransportError::Api {
                    code: 500,
                    message: format!("injected report failure for chunk {chunk_index}"),
                })
            } else {
                Ok(())
            }
        })
    }

    fn merge_chunks(
        &self,
        _file_hash: &ContentHash,
        filename: &str,
    ) -> TransportFuture<'_, String> {
        self.record(Call::MergeChunks {
            filename: filename.to_string(),
        });
        Box::pin(async move {
            let mut results = self.merge_results.lock().unwrap();
            if results.is_empty() {
                Ok("https://cdn.example.com/merged.mp4".to_string())
            } else {
                results.remove(0)
            }
        })
    }

    fn presign_single(
        &self,
        _file_hash: &ContentHash,
        filename: &str,
    ) -> TransportFuture<'_, PresignResponse> {
        self.record(Call::PresignSingle {
            filename: filename.to_string(),
        });
        Box::pin(async move {
            let mut responses = self.presign_responses.lock().unwrap();
            if responses.is_empty() {
                Err(TransportError::Network("no scripted presign response".into()))
            } else {
                responses.remove(0)
            }
        })
    }

    fn upload_single(
        &self,
        _file_hash: &ContentHash,
        _filename: &str,
        data: Vec<u8>,
    ) -> TransportFuture<'_, String> {
        self.record(Call::UploadSingle { len: data.len() });
        Box::pin(async move {
            let mut results = self.single_results.lock().unwrap();
            if results.is_empty() {
                Ok("https://cdn.example.com/single.mp4".to_string())
            } else {
                results.remove(0)
            }
        })
    }
}

/// Writes `data` to `dir/name` and returns the path.
pub(crate) fn write_test_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}
