use super::document_store::{document_id, DocumentStore, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

/// Process-local document store
///
/// Used by tests and by deployments without `DATABASE_URL`; contents are lost
/// on restart.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: DashMap<String, Value>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, id: &str) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .documents
            .get(id)
            .map(|doc| vec![doc.value().clone()])
            .unwrap_or_default())
    }

    async fn put(&self, document: Value) -> Result<(), StoreError> {
        let id = document_id(&document)?.to_string();
        self.documents.insert(id, document);
        Ok(())
    }
}
