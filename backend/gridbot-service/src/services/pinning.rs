/// NFT.storage pinning client
///
/// Thin wrapper over the HTTP API: raw uploads, single-file directory
/// uploads, and the list/status lookups proxied by the storage routes.
/// Every call carries the API key as a bearer token.
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum PinningError {
    #[error("pinning service is not configured")]
    NotConfigured,

    #[error("pinning request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("pinning service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("pinning service rejected the upload: {0}")]
    Rejected(String),
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    ok: bool,
    value: Option<UploadValue>,
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct UploadValue {
    cid: String,
}

#[derive(Clone)]
pub struct NftStorageClient {
    http: Client,
    api_url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for NftStorageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NftStorageClient")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl NftStorageClient {
    pub fn new(http: Client, api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Pin raw bytes, returning the content id
    pub async fn upload_bytes(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, PinningError> {
        let request = self
            .http
            .post(format!("{}/upload", self.api_url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);

        let cid = self.upload(request).await?;
        tracing::info!(%cid, "pinned raw upload");
        Ok(cid)
    }

    /// Pin a single file wrapped in a directory, returning the directory cid
    ///
    /// The file is then reachable as `ipfs://<cid>/<file_name>`.
    pub async fn upload_file(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, PinningError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let request = self
            .http
            .post(format!("{}/upload", self.api_url))
            .multipart(Form::new().part("file", part));

        let cid = self.upload(request).await?;
        tracing::info!(%cid, file = file_name, "pinned directory upload");
        Ok(cid)
    }

    /// Stored uploads for the configured key, as returned upstream
    pub async fn list(&self) -> Result<Value, PinningError> {
        let request = self.http.get(format!("{}/", self.api_url));
        Ok(self.send(request).await?.json().await?)
    }

    /// Pin status of one cid, as returned upstream
    pub async fn status(&self, cid: &str) -> Result<Value, PinningError> {
        let request = self.http.get(format!("{}/{}", self.api_url, cid));
        Ok(self.send(request).await?.json().await?)
    }

    async fn upload(&self, request: RequestBuilder) -> Result<String, PinningError> {
        let body: UploadResponse = self.send(request).await?.json().await?;
        match (body.ok, body.value) {
            (true, Some(value)) => Ok(value.cid),
            (_, _) => Err(PinningError::Rejected(
                body.error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no cid in response".to_string()),
            )),
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, PinningError> {
        let key = self.api_key.as_deref().ok_or(PinningError::NotConfigured)?;

        let response = request.bearer_auth(key).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), %body, "pinning service error");
        Err(PinningError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
