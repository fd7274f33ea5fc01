use super::document_store::{DocumentStore, StoreError};
use crate::domain::LikeRecord;
use std::sync::Arc;

/// Typed access to like documents
///
/// Documents are validated on the way out of the store: a record whose
/// `_id` does not match, whose count disagrees with its wallets, or which
/// lists a wallet twice is rejected rather than trusted.
#[derive(Clone)]
pub struct LikeRepository {
    store: Arc<dyn DocumentStore>,
}

impl LikeRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn find(&self, content_id: &str) -> Result<Option<LikeRecord>, StoreError> {
        let mut documents = self.store.get(content_id).await?;
        if documents.len() > 1 {
            tracing::warn!(
                cid = %content_id,
                count = documents.len(),
                "multiple like documents for one id; using the first"
            );
        }
        if documents.is_empty() {
            return Ok(None);
        }

        let document = documents.swap_remove(0);
        let malformed = |reason: String| StoreError::Malformed {
            id: content_id.to_string(),
            reason,
        };

        let record: LikeRecord =
            serde_json::from_value(document).map_err(|e| malformed(e.to_string()))?;
        if record.id != content_id {
            return Err(malformed(format!("stored under mismatched _id {}", record.id)));
        }
        record.likes.validate().map_err(|e| malformed(e.to_string()))?;

        Ok(Some(record))
    }

    pub async fn save(&self, record: &LikeRecord) -> Result<(), StoreError> {
        let document = serde_json::to_value(record).map_err(|e| StoreError::Malformed {
            id: record.id.clone(),
            reason: e.to_string(),
        })?;
        self.store.put(document).await
    }
}
