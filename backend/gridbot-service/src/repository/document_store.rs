use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error("malformed document {id}: {reason}")]
    Malformed { id: String, reason: String },

    #[error("document store error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Key/document store keyed by the document's `_id`
///
/// `put` is a full replace; there is no compare-and-swap, so callers that
/// read-modify-write must serialize per key themselves.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents stored under `id` (empty when absent)
    async fn get(&self, id: &str) -> Result<Vec<Value>, StoreError>;

    /// Replace the document stored under its `_id`
    async fn put(&self, document: Value) -> Result<(), StoreError>;

    /// Release connections; called once at shutdown
    async fn close(&self) {}
}

/// The `_id` of a document, which must be a non-empty string
pub fn document_id(document: &Value) -> Result<&str, StoreError> {
    document
        .get("_id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| StoreError::Malformed {
            id: "<unknown>".to_string(),
            reason: "missing string _id".to_string(),
        })
}
