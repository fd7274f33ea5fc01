/// IPFS gateway client
///
/// Fetches the `metadata.json` an NFT was pinned with. The gateway URL is a
/// template in which `{cid}` is replaced by the content identifier.
use reqwest::Client;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("invalid content id {0:?}")]
    InvalidCid(String),

    #[error("gateway request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("gateway returned {status}")]
    Status { status: u16 },
}

#[derive(Clone)]
pub struct GatewayClient {
    http: Client,
    url_template: String,
}

impl GatewayClient {
    pub fn new(http: Client, url_template: impl Into<String>) -> Self {
        Self {
            http,
            url_template: url_template.into(),
        }
    }

    /// Gateway URL for `cid`
    ///
    /// CIDs end up in the host part of subdomain gateways, so only ASCII
    /// alphanumerics are accepted.
    pub fn metadata_url(&self, cid: &str) -> Result<String, GatewayError> {
        if cid.is_empty() || !cid.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(GatewayError::InvalidCid(cid.to_string()));
        }
        Ok(self.url_template.replace("{cid}", cid))
    }

    pub async fn fetch_metadata(&self, cid: &str) -> Result<Value, GatewayError> {
        let url = self.metadata_url(cid)?;
        tracing::debug!(%cid, %url, "fetching metadata from gateway");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%cid, status = status.as_u16(), "gateway rejected metadata fetch");
            return Err(GatewayError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}
