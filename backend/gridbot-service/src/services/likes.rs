/// Like toggle engine
///
/// One endpoint serves both directions: a wallet that already liked a content
/// identifier unlikes it, any other wallet likes it. The store write is a full
/// replace of the document.
use crate::domain::{normalize_wallet, LikeRecord};
use crate::repository::{DocumentStore, LikeRepository, StoreError};
use crate::services::key_lock::KeyedLocks;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum LikeError {
    #[error("content id must not be empty")]
    EmptyContentId,

    #[error("wallet must not be empty")]
    EmptyWallet,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct LikeService {
    repo: LikeRepository,
    locks: KeyedLocks,
    wallet_case_sensitive: bool,
}

impl LikeService {
    pub fn new(store: Arc<dyn DocumentStore>, wallet_case_sensitive: bool) -> Self {
        Self {
            repo: LikeRepository::new(store),
            locks: KeyedLocks::new(),
            wallet_case_sensitive,
        }
    }

    /// Current record for `content_id`, if anyone ever toggled it
    pub async fn get_record(&self, content_id: &str) -> Result<Option<LikeRecord>, LikeError> {
        Ok(self.repo.find(content_id).await?)
    }

    /// Flip `wallet`'s like on `content_id` and persist the result
    ///
    /// Concurrent toggles on the same id are serialized within this process,
    /// so no like/unlike is lost between the read and the write.
    pub async fn toggle_like(
        &self,
        content_id: &str,
        wallet: &str,
    ) -> Result<LikeRecord, LikeError> {
        if content_id.trim().is_empty() {
            return Err(LikeError::EmptyContentId);
        }
        let wallet = normalize_wallet(wallet, self.wallet_case_sensitive);
        if wallet.is_empty() {
            return Err(LikeError::EmptyWallet);
        }

        let _guard = self.locks.lock(content_id).await;

        let mut record = self
            .repo
            .find(content_id)
            .await?
            .unwrap_or_else(|| LikeRecord::empty(content_id));

        let action = record.likes.toggle(&wallet);
        self.repo.save(&record).await?;

        info!(
            cid = %content_id,
            wallet = %wallet,
            action = action.as_str(),
            likes = record.likes.value,
            "like toggled"
        );

        Ok(record)
    }
}
