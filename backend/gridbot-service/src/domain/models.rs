/// Domain models for gridbot-service
///
/// A `LikeRecord` is the per-NFT like counter stored in the document store.
/// The wire shape is fixed by the frontend:
///
/// ```json
/// { "_id": "<cid>", "likes": { "value": 1, "wallets": ["0xab.."] } }
/// ```
use serde::{Deserialize, Serialize};

/// Like counter for one content identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub likes: Likes,
}

/// `value` always equals `wallets.len()`; a wallet appears at most once
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Likes {
    pub value: u64,
    pub wallets: Vec<String>,
}

/// Direction a toggle went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeAction {
    Liked,
    Unliked,
}

impl LikeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Liked => "liked",
            Self::Unliked => "unliked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("like count {value} does not match {wallets} wallets")]
    CountMismatch { value: u64, wallets: usize },

    #[error("wallet {0} appears more than once")]
    DuplicateWallet(String),
}

impl LikeRecord {
    /// Record for a content identifier nobody has liked yet
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            likes: Likes::default(),
        }
    }
}

impl Likes {
    pub fn contains(&self, wallet: &str) -> bool {
        self.wallets.iter().any(|w| w == wallet)
    }

    /// Remove `wallet` if present, otherwise add it
    pub fn toggle(&mut self, wallet: &str) -> LikeAction {
        match self.wallets.iter().position(|w| w == wallet) {
            Some(index) => {
                self.wallets.remove(index);
                self.value = self.value.saturating_sub(1);
                LikeAction::Unliked
            }
            None => {
                self.wallets.push(wallet.to_string());
                self.value += 1;
                LikeAction::Liked
            }
        }
    }

    pub fn validate(&self) -> Result<(), InvariantViolation> {
        if self.value != self.wallets.len() as u64 {
            return Err(InvariantViolation::CountMismatch {
                value: self.value,
                wallets: self.wallets.len(),
            });
        }

        let mut seen = std::collections::HashSet::with_capacity(self.wallets.len());
        for wallet in &self.wallets {
            if !seen.insert(wallet.as_str()) {
                return Err(InvariantViolation::DuplicateWallet(wallet.clone()));
            }
        }

        Ok(())
    }
}

/// Canonical form of a wallet identifier used for like membership
///
/// Addresses are compared lowercase unless the legacy case-sensitive mode is on.
pub fn normalize_wallet(raw: &str, case_sensitive: bool) -> String {
    let trimmed = raw.trim();
    if case_sensitive {
        trimmed.to_string()
    } else {
        trimmed.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_toggle_likes() {
        let mut likes = Likes::default();
        assert_eq!(likes.toggle("0xaa"), LikeAction::Liked);
        assert_eq!(likes.value, 1);
        assert_eq!(likes.wallets, vec!["0xaa".to_string()]);
    }

    #[test]
    fn toggle_scenario() {
        let mut likes = Likes::default();

        likes.toggle("wallet1");
        assert_eq!(likes, Likes { value: 1, wallets: vec!["wallet1".into()] });

        assert_eq!(likes.toggle("wallet1"), LikeAction::Unliked);
        assert_eq!(likes, Likes::default());

        likes.toggle("wallet2");
        assert_eq!(likes, Likes { value: 1, wallets: vec!["wallet2".into()] });
    }

    #[test]
    fn unlike_keeps_order_of_remaining_wallets() {
        let mut likes = Likes::default();
        for w in ["a", "b", "c"] {
            likes.toggle(w);
        }
        likes.toggle("b");
        assert_eq!(likes.wallets, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(likes.value, 2);
    }

    #[test]
    fn validate_rejects_broken_documents() {
        let mismatch = Likes { value: 3, wallets: vec!["a".into()] };
        assert_eq!(
            mismatch.validate(),
            Err(InvariantViolation::CountMismatch { value: 3, wallets: 1 })
        );

        let duplicate = Likes { value: 2, wallets: vec!["a".into(), "a".into()] };
        assert_eq!(
            duplicate.validate(),
            Err(InvariantViolation::DuplicateWallet("a".into()))
        );
    }

    #[test]
    fn record_wire_format() {
        let mut record = LikeRecord::empty("bafycid");
        record.likes.toggle("0xaa");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "_id": "bafycid", "likes": { "value": 1, "wallets": ["0xaa"] } })
        );
    }

    #[test]
    fn normalize_wallet_modes() {
        assert_eq!(normalize_wallet(" 0xAbC ", false), "0xabc");
        assert_eq!(normalize_wallet(" 0xAbC ", true), "0xAbC");
    }

    proptest! {
        #[test]
        fn toggling_twice_restores_state(
            start in proptest::collection::hash_set("[a-f0-9]{4}", 0..8),
            wallet in "[a-f0-9]{4}",
        ) {
            let wallets: Vec<String> = start.into_iter().collect();
            let original = Likes { value: wallets.len() as u64, wallets };

            let mut likes = original.clone();
            likes.toggle(&wallet);
            likes.toggle(&wallet);

            prop_assert_eq!(likes.value, original.value);
            let mut got = likes.wallets.clone();
            let mut want = original.wallets.clone();
            got.sort();
            want.sort();
            prop_assert_eq!(got, want);
        }

        #[test]
        fn invariants_hold_for_any_sequence(ops in proptest::collection::vec("[a-c]", 0..64)) {
            let mut likes = Likes::default();
            for wallet in &ops {
                likes.toggle(wallet);
                prop_assert!(likes.validate().is_ok());
            }
        }
    }
}
