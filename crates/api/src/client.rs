//! HTTP client for the upload service.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use medialift_protocol::{
    ApiEnvelope, MergeChunksRequest, PresignChunkRequest, PresignResponse, PresignSingleRequest,
    ReportChunkRequest, SingleUploadData,
};
use medialift_transfer::ContentHash;
use medialift_uploader::{TransportError, TransportFuture, UploadTransport};

// Endpoint paths under the API base URL.
const PRESIGN_CHUNK: &str = "/upload/pre-sign";
const UPLOAD_CHUNK: &str = "/upload/upload-chunk";
const REPORT_CHUNK: &str = "/upload/report-chunk";
const MERGE_CHUNKS: &str = "/upload/merge-report";
const PRESIGN_SINGLE: &str = "/upload/pre-sign-single";
const UPLOAD_SINGLE: &str = "/upload/upload-single";

/// HTTP implementation of [`UploadTransport`].
///
/// Attaches the issued bearer token to every request via a default header;
/// token acquisition itself is the auth layer's problem, not this client's.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Creates a transport for `base_url` with the given bearer token.
    pub fn new(base_url: impl Into<String>, token: &str) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, token, None)
    }

    /// Same as [`new`](Self::new) with an overall per-request timeout.
    ///
    /// The upload core applies no per-chunk timeout of its own, so this is
    /// the only bound on a stuck transfer.
    pub fn with_timeout(
        base_url: impl Into<String>,
        token: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| TransportError::InvalidToken)?,
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Posts a JSON body and extracts the envelope payload.
    async fn post_json<R: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        req: &R,
    ) -> Result<T, TransportError> {
        let envelope: ApiEnvelope<T> = self.send_json(endpoint, req).await?;
        Ok(envelope.into_data()?)
    }

    /// Posts a JSON body where only the envelope code matters.
    async fn post_json_ack<R: Serialize>(
        &self,
        endpoint: &str,
        req: &R,
    ) -> Result<(), TransportError> {
        let envelope: ApiEnvelope<serde_json::Value> = self.send_json(endpoint, req).await?;
        envelope.ensure_success()?;
        Ok(())
    }

    /// Posts a multipart form and extracts the envelope payload.
    async fn post_form<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: Form,
    ) -> Result<T, TransportError> {
        let envelope: ApiEnvelope<T> = self.send_form(endpoint, form).await?;
        Ok(envelope.into_data()?)
    }

    /// Posts a multipart form where only the envelope code matters.
    async fn post_form_ack(&self, endpoint: &str, form: Form) -> Result<(), TransportError> {
        let envelope: ApiEnvelope<serde_json::Value> = self.send_form(endpoint, form).await?;
        envelope.ensure_success()?;
        Ok(())
    }

    async fn send_json<R: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        req: &R,
    ) -> Result<ApiEnvelope<T>, TransportError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "POST");
        let resp = self
            .http
            .post(&url)
            .json(req)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        decode(resp).await
    }

    async fn send_form<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: Form,
    ) -> Result<ApiEnvelope<T>, TransportError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "POST multipart");
        let resp = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        decode(resp).await
    }
}

/// Checks the HTTP status and decodes the response envelope.
async fn decode<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<ApiEnvelope<T>, TransportError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(TransportError::Api {
            code: i32::from(status.as_u16()),
            message: body,
        });
    }
    resp.json::<ApiEnvelope<T>>()
        .await
        .map_err(|e| TransportError::InvalidResponse(e.to_string()))
}

/// Builds the `file` part of an upload form.
fn octet_part(name: String, data: Vec<u8>) -> Result<Part, TransportError> {
    Part::bytes(data)
        .file_name(name)
        .mime_str("application/octet-stream")
        .map_err(|e| TransportError::Network(e.to_string()))
}

impl UploadTransport for HttpTransport {
    fn presign(
        &self,
        file_hash: &ContentHash,
        total_chunks: u32,
        filename: &str,
    ) -> TransportFuture<'_, PresignResponse> {
        let req = PresignChunkRequest {
            file_hash: file_hash.as_str().to_string(),
            total_chunks,
            filename: filename.to_string(),
        };
        Box::pin(async move { self.post_json(PRESIGN_CHUNK, &req).await })
    }

    fn upload_chunk(
        &self,
        file_hash: &ContentHash,
        chunk_index: u32,
        data: Vec<u8>,
    ) -> TransportFuture<'_, ()> {
        let hash = file_hash.as_str().to_string();
        Box::pin(async move {
            let part = octet_part(format!("chunk-{chunk_index}"), data)?;
            let form = Form::new()
                .part("file", part)
                .text("fileHash", hash)
                .text("chunkIndex", chunk_index.to_string());
            self.post_form_ack(UPLOAD_CHUNK, form).await
        })
    }

    fn report_chunk(&self, file_hash: &ContentHash, chunk_index: u32) -> TransportFuture<'_, ()> {
        let req = ReportChunkRequest {
            file_hash: file_hash.as_str().to_string(),
            chunk_index,
        };
        Box::pin(async move { self.post_json_ack(REPORT_CHUNK, &req).await })
    }

    fn merge_chunks(
        &self,
        file_hash: &ContentHash,
        filename: &str,
    ) -> TransportFuture<'_, String> {
        let req = MergeChunksRequest {
            file_hash: file_hash.as_str().to_string(),
            filename: filename.to_string(),
        };
        // The merge endpoint's payload is the final URL itself.
        Box::pin(async move { self.post_json::<_, String>(MERGE_CHUNKS, &req).await })
    }

    fn presign_single(
        &self,
        file_hash: &ContentHash,
        filename: &str,
    ) -> TransportFuture<'_, PresignResponse> {
        let req = PresignSingleRequest {
            filename: filename.to_string(),
            file_hash: file_hash.as_str().to_string(),
        };
        Box::pin(async move { self.post_json(PRESIGN_SINGLE, &req).await })
    }

    fn upload_single(
        &self,
        file_hash: &ContentHash,
        filename: &str,
        data: Vec<u8>,
    ) -> TransportFuture<'_, String> {
        let hash = file_hash.as_str().to_string();
        let filename = filename.to_string();
        Box::pin(async move {
            let part = octet_part(filename, data)?;
            let form = Form::new().part("file", part).text("fileHash", hash);
            let resp: SingleUploadData = self.post_form(UPLOAD_SINGLE, form).await?;
            Ok(resp.url)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let t = HttpTransport::new("https://api.example.com/", "token").unwrap();
        assert_eq!(t.base_url(), "https://api.example.com");
    }

    #[test]
    fn keeps_base_url_without_slash() {
        let t = HttpTransport::new("https://api.example.com", "token").unwrap();
        assert_eq!(t.base_url(), "https://api.example.com");
    }

    #[test]
    fn rejects_unusable_token() {
        let result = HttpTransport::new("https://api.example.com", "bad\ntoken");
        assert!(matches!(result, Err(TransportError::InvalidToken)));
    }

    #[test]
    fn octet_part_accepts_chunk_names() {
        assert!(octet_part("chunk-0".into(), vec![1, 2, 3]).is_ok());
    }
}
