use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::StatusCode,
    web, Error, HttpMessage, HttpResponse,
};
use crypto_core::jwt::JwtKeys;
use crypto_core::wallet;
use error_types::{error_codes, error_types as kinds, ErrorResponse};
use futures::future::{ready, Ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

/// Verification settings shared by every worker
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub keys: JwtKeys,
    /// Message the wallet signature in the token was produced over
    pub challenge_message: String,
    /// Legacy mode: the `wallet` query parameter must already be lowercase
    pub wallet_case_sensitive: bool,
}

impl AuthConfig {
    pub fn new(keys: JwtKeys) -> Self {
        Self {
            keys,
            challenge_message: wallet::DEFAULT_CHALLENGE_MESSAGE.to_string(),
            wallet_case_sensitive: false,
        }
    }
}

/// Wallet address from the `wallet` query parameter, proven to be the signer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedWallet(pub String);

/// Why a request was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    MissingCredential,
    InvalidCredential,
    WalletMismatch,
}

impl Rejection {
    fn into_response(self) -> HttpResponse {
        let (status, error, kind, code, message) = match self {
            Rejection::MissingCredential => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                kinds::AUTHENTICATION_ERROR,
                error_codes::MISSING_CREDENTIALS,
                "Missing bearer token",
            ),
            Rejection::InvalidCredential => (
                StatusCode::FORBIDDEN,
                "Forbidden",
                kinds::AUTHORIZATION_ERROR,
                error_codes::INVALID_CREDENTIALS,
                "Invalid bearer token",
            ),
            Rejection::WalletMismatch => (
                StatusCode::FORBIDDEN,
                "Forbidden",
                kinds::AUTHORIZATION_ERROR,
                error_codes::WALLET_MISMATCH,
                "Wallet does not match token signer",
            ),
        };

        HttpResponse::build(status).json(ErrorResponse::new(
            error,
            message,
            status.as_u16(),
            kind,
            code,
        ))
    }
}

/// Bearer token + wallet ownership middleware
///
/// - no usable `Authorization: Bearer` header: `401`
/// - token fails HS256/expiry validation: `403`
/// - `wallet` query parameter present and not the signer of the token's
///   `signature` claim: `403`
pub struct JwtAuthMiddleware {
    config: Arc<AuthConfig>,
}

impl JwtAuthMiddleware {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self { config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = JwtAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            config: self.config.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    config: Arc<AuthConfig>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let config = self.config.clone();

        Box::pin(async move {
            match authenticate(&req, &config) {
                Ok(wallet) => {
                    if let Some(wallet) = wallet {
                        req.extensions_mut().insert(wallet);
                    }
                    service.call(req).await.map(|res| res.map_into_left_body())
                }
                Err(rejection) => {
                    let response = rejection.into_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

fn authenticate(
    req: &ServiceRequest,
    config: &AuthConfig,
) -> Result<Option<AuthenticatedWallet>, Rejection> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(Rejection::MissingCredential)?;

    let claims = config.keys.validate(token).map_err(|e| {
        tracing::warn!(path = %req.path(), "JWT validation failed: {}", e);
        Rejection::InvalidCredential
    })?;

    let Some(wallet) = wallet_param(req.query_string())? else {
        return Ok(None);
    };

    let signature = claims.signature.as_deref().ok_or_else(|| {
        tracing::warn!(%wallet, "token carries no wallet signature");
        Rejection::WalletMismatch
    })?;

    let signer = wallet::recover_signer(&config.challenge_message, signature).map_err(|e| {
        tracing::warn!(%wallet, "wallet signature recovery failed: {}", e);
        Rejection::WalletMismatch
    })?;

    if !wallet::addresses_match(&wallet, &signer, config.wallet_case_sensitive) {
        tracing::warn!(%wallet, %signer, "wallet does not match token signer");
        return Err(Rejection::WalletMismatch);
    }

    Ok(Some(AuthenticatedWallet(wallet)))
}

/// The single `wallet` query parameter, trimmed
///
/// A query that cannot be decoded, or that names `wallet` more than once,
/// is rejected rather than treated as carrying no wallet.
fn wallet_param(query: &str) -> Result<Option<String>, Rejection> {
    let pairs = web::Query::<Vec<(String, String)>>::from_query(query)
        .map_err(|e| {
            tracing::warn!("undecodable query string: {}", e);
            Rejection::WalletMismatch
        })?
        .into_inner();

    let mut wallets = pairs
        .into_iter()
        .filter(|(key, _)| key == "wallet")
        .map(|(_, value)| value.trim().to_string());
    let wallet = wallets.next();
    if wallets.next().is_some() {
        tracing::warn!("wallet query parameter repeated");
        return Err(Rejection::WalletMismatch);
    }

    Ok(wallet)
}

impl actix_web::FromRequest for AuthenticatedWallet {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        match req.extensions().get::<AuthenticatedWallet>() {
            Some(wallet) => ready(Ok(wallet.clone())),
            None => ready(Err(actix_web::error::ErrorBadRequest(
                "wallet query parameter required",
            ))),
        }
    }
}
