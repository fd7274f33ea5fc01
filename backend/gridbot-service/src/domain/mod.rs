pub mod models;

pub use models::{normalize_wallet, InvariantViolation, LikeAction, LikeRecord, Likes};
