//! Credential primitives shared by Grid Bot services
//!
//! - `jwt`: HS256 bearer token issue/validation
//! - `wallet`: Ethereum `personal_sign` signer recovery

pub mod jwt;
pub mod wallet;

pub use jwt::{Claims, JwtError, JwtKeys};
pub use wallet::{WalletError, DEFAULT_CHALLENGE_MESSAGE};
