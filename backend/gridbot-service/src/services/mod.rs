/// Service layer for gridbot-service
///
/// This module provides business logic for:
/// - Like service: per-NFT like toggling
/// - Image: resize + AVIF conversion
/// - Gateway / pinning: outbound calls to IPFS and NFT.storage
pub mod gateway;
pub mod image;
pub mod key_lock;
pub mod likes;
pub mod pinning;

pub use gateway::{GatewayClient, GatewayError};
pub use self::image::{ConvertedImage, Dimensions, ImageError};
pub use key_lock::KeyedLocks;
pub use likes::{LikeError, LikeService};
pub use pinning::{NftStorageClient, PinningError};
