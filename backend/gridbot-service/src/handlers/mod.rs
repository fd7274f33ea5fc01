/// HTTP handlers for gridbot-service
///
/// - NFT: metadata lookup, like toggle, upload, storage proxy
/// - Converter: image resize + AVIF re-encode
/// - Health: unauthenticated liveness and readiness checks
pub mod converter;
pub mod health;
pub mod multipart;
pub mod nft;

use crate::error::AppError;
use crate::services::{GatewayClient, LikeService, NftStorageClient};
use actix_middleware::{AuthConfig, JwtAuthMiddleware};
use actix_web::web;
use std::sync::Arc;

pub use converter::convert_image;
pub use nft::{create_like, get_metadata, get_storage, list_storage, merge_metadata, upload_nft};

/// Everything the handlers pull out of `web::Data`
#[derive(Clone)]
pub struct AppState {
    pub likes: LikeService,
    pub gateway: GatewayClient,
    pub pinning: NftStorageClient,
}

/// Register routes, shared state and extractor error handling
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState, auth: Arc<AuthConfig>) {
    cfg.app_data(web::Data::new(state.likes.clone()))
        .app_data(web::Data::new(state.gateway.clone()))
        .app_data(web::Data::new(state.pinning.clone()))
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            AppError::bad_request(format!("invalid JSON body: {}", err)).into()
        }))
        .app_data(web::QueryConfig::default().error_handler(|err, _req| {
            AppError::bad_request(format!("invalid query string: {}", err)).into()
        }))
        .route("/health", web::get().to(health::health))
        .route("/health/ready", web::get().to(health::ready))
        .route("/health/live", web::get().to(health::live))
        .service(
            web::scope("/api/v1")
                .wrap(JwtAuthMiddleware::new(auth))
                .service(
                    web::scope("/nft")
                        .route("/metadata/{cid}", web::get().to(get_metadata))
                        .route("/create", web::put().to(create_like))
                        .route("/upload", web::post().to(upload_nft))
                        .route("/storage", web::get().to(list_storage))
                        .route("/storage/{cid}", web::get().to(get_storage)),
                )
                .route("/converter/image", web::post().to(convert_image)),
        );
}
