//! Grid Bot Service
//!
//! HTTP backend for the grid bot NFT frontend: per-NFT like counters,
//! NFT.storage pinning, IPFS metadata lookup and AVIF image conversion,
//! all behind a JWT + wallet signature check.

pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod repository;
pub mod services;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};
pub use handlers::{configure, AppState};
