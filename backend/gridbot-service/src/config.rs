/// Configuration management for gridbot-service
///
/// Loads configuration from environment variables with sensible defaults.
/// Only `TOKEN_SECRET` is mandatory.
use crypto_core::DEFAULT_CHALLENGE_MESSAGE;
use std::time::Duration;

/// Gateway URL used when `IPFS_GATEWAY_URL_TEMPLATE` is unset; `{cid}` is substituted
pub const DEFAULT_GATEWAY_TEMPLATE: &str = "https://{cid}.ipfs.nftstorage.link/metadata.json";
pub const DEFAULT_PINNING_API_URL: &str = "https://api.nft.storage";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub auth: AuthSettings,
    pub database: Option<DatabaseConfig>,
    pub pinning: PinningConfig,
    pub gateway: GatewayConfig,
    pub rpc: RpcConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Timeout for every outbound HTTP call (gateway, pinning service)
    pub http_timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct CorsConfig {
    /// `*` allows any origin
    pub allowed_origin: String,
}

#[derive(Clone)]
pub struct AuthSettings {
    pub token_secret: String,
    pub challenge_message: String,
    pub wallet_case_sensitive: bool,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("token_secret", &"<redacted>")
            .field("challenge_message", &self.challenge_message)
            .field("wallet_case_sensitive", &self.wallet_case_sensitive)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone)]
pub struct PinningConfig {
    pub api_url: String,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for PinningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinningConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub url_template: String,
}

#[derive(Clone, Debug)]
pub struct RpcConfig {
    pub url: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token_secret = var("TOKEN_SECRET").ok_or(ConfigError::Missing("TOKEN_SECRET"))?;

        let database = var("DATABASE_URL")
            .map(|url| -> Result<DatabaseConfig, ConfigError> {
                Ok(DatabaseConfig {
                    url,
                    max_connections: parse_or(
                        "DATABASE_MAX_CONNECTIONS",
                        var("DATABASE_MAX_CONNECTIONS"),
                        10,
                    )?,
                })
            })
            .transpose()?;

        let format = match var("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    value: other.to_string(),
                })
            }
        };

        Ok(Config {
            app: AppConfig {
                host: var("GRIDBOT_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or("PORT", var("PORT"), 8080)?,
                http_timeout: Duration::from_secs(parse_or(
                    "HTTP_TIMEOUT_SECS",
                    var("HTTP_TIMEOUT_SECS"),
                    30,
                )?),
            },
            cors: CorsConfig {
                allowed_origin: var("CORS_ORIGIN").unwrap_or_else(|| "*".to_string()),
            },
            auth: AuthSettings {
                token_secret,
                challenge_message: var("AUTH_CHALLENGE_MESSAGE")
                    .unwrap_or_else(|| DEFAULT_CHALLENGE_MESSAGE.to_string()),
                wallet_case_sensitive: parse_bool(
                    "WALLET_CASE_SENSITIVE",
                    var("WALLET_CASE_SENSITIVE"),
                )?,
            },
            database,
            pinning: PinningConfig {
                api_url: var("NFT_STORAGE_API_URL")
                    .unwrap_or_else(|| DEFAULT_PINNING_API_URL.to_string()),
                api_key: var("NFT_STORAGE_API_KEY"),
            },
            gateway: GatewayConfig {
                url_template: var("IPFS_GATEWAY_URL_TEMPLATE")
                    .unwrap_or_else(|| DEFAULT_GATEWAY_TEMPLATE.to_string()),
            },
            rpc: RpcConfig {
                url: var("QUICKNODE_RPC"),
            },
            log: LogConfig { format },
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

fn parse_bool(key: &'static str, raw: Option<String>) -> Result<bool, ConfigError> {
    let Some(value) = raw else {
        return Ok(false);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { key, value }),
    }
}
