//! # Actix Middleware Library
//!
//! Middleware components for Grid Bot actix services
//!
//! ## Modules
//! - `jwt_auth`: bearer token + wallet ownership authentication

pub mod jwt_auth;

pub use jwt_auth::{AuthConfig, AuthenticatedWallet, JwtAuthMiddleware};
