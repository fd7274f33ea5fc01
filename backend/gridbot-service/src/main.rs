/// Grid Bot Service - HTTP Server
///
/// Serves the NFT like counters, metadata lookup, pinning and image
/// conversion endpoints.
use actix_cors::Cors;
use actix_middleware::AuthConfig;
use actix_web::{App, HttpServer};
use anyhow::Context;
use crypto_core::JwtKeys;
use gridbot_service::logging::init_tracing;
use gridbot_service::repository::{DocumentStore, MemoryDocumentStore, PgDocumentStore};
use gridbot_service::services::{GatewayClient, LikeService, NftStorageClient};
use gridbot_service::{configure, AppState, Config};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(&config.log);

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!(%bind_address, "gridbot-service starting");

    if let Some(rpc) = &config.rpc.url {
        tracing::info!(%rpc, "RPC endpoint configured; wallet signatures are recovered locally");
    }

    let store: Arc<dyn DocumentStore> = match &config.database {
        Some(database) => Arc::new(
            PgDocumentStore::connect(database)
                .await
                .context("Failed to connect document store")?,
        ),
        None => {
            tracing::warn!("DATABASE_URL not set; likes are kept in memory and lost on restart");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    let http = reqwest::Client::builder()
        .timeout(config.app.http_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    if config.pinning.api_key.is_none() {
        tracing::warn!("NFT_STORAGE_API_KEY not set; upload and storage routes will fail");
    }

    let state = AppState {
        likes: LikeService::new(store.clone(), config.auth.wallet_case_sensitive),
        gateway: GatewayClient::new(http.clone(), config.gateway.url_template.clone()),
        pinning: NftStorageClient::new(
            http,
            config.pinning.api_url.clone(),
            config.pinning.api_key.clone(),
        ),
    };

    let keys = JwtKeys::from_secret(&config.auth.token_secret)
        .context("Failed to initialize JWT keys")?;
    let auth = Arc::new(AuthConfig {
        keys,
        challenge_message: config.auth.challenge_message.clone(),
        wallet_case_sensitive: config.auth.wallet_case_sensitive,
    });

    let allowed_origin = config.cors.allowed_origin.clone();

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);
        let cors = if allowed_origin == "*" {
            cors.allow_any_origin()
        } else {
            cors.allowed_origin(&allowed_origin)
        };

        let state = state.clone();
        let auth = auth.clone();
        App::new()
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(move |cfg| configure(cfg, &state, auth))
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await
    .context("HTTP server error")?;

    tracing::info!("gridbot-service shutting down");
    store.close().await;

    Ok(())
}
