/// Error types for gridbot-service
///
/// Domain errors from the like engine, the stores, image conversion and the
/// outbound clients are folded into [`AppError`], which renders the shared
/// [`ErrorResponse`] body.
use crate::repository::StoreError;
use crate::services::{GatewayError, ImageError, LikeError, PinningError};
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use error_types::{error_codes, error_types as kinds, ErrorResponse};
use std::fmt;

/// Result type for gridbot-service handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// No usable credentials on the request
    Unauthorized(String),

    /// Credentials present but not accepted
    Forbidden(String),

    /// Client input or a collaborator we depend on rejected the request
    BadRequest { code: &'static str, message: String },

    PayloadTooLarge(String),

    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            code: error_codes::INVALID_REQUEST,
            message: message.into(),
        }
    }

    fn upstream(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            code: error_codes::UPSTREAM_ERROR,
            message: message.into(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest { message, .. } => write!(f, "Bad request: {}", message),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (error_type, code) = match self {
            AppError::Unauthorized(_) => {
                (kinds::AUTHENTICATION_ERROR, error_codes::MISSING_CREDENTIALS)
            }
            AppError::Forbidden(_) => (kinds::AUTHORIZATION_ERROR, error_codes::INVALID_CREDENTIALS),
            AppError::BadRequest { code, .. } => (kinds::VALIDATION_ERROR, *code),
            AppError::PayloadTooLarge(_) => {
                (kinds::VALIDATION_ERROR, error_codes::PAYLOAD_TOO_LARGE)
            }
            AppError::Internal(_) => (kinds::SERVER_ERROR, error_codes::INTERNAL_SERVER_ERROR),
        };

        let message = self.to_string();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), code, "{}", message);
        } else {
            tracing::warn!(status = status.as_u16(), code, "{}", message);
        }

        let response = ErrorResponse::new(
            status.canonical_reason().unwrap_or("Error"),
            &message,
            status.as_u16(),
            error_type,
            code,
        );

        HttpResponse::build(status).json(response)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Malformed { .. } => AppError::Internal(err.to_string()),
            StoreError::Unavailable(_) | StoreError::Backend(_) => AppError::BadRequest {
                code: error_codes::STORE_UNAVAILABLE,
                message: err.to_string(),
            },
        }
    }
}

impl From<LikeError> for AppError {
    fn from(err: LikeError) -> Self {
        match err {
            LikeError::EmptyContentId | LikeError::EmptyWallet => {
                AppError::bad_request(err.to_string())
            }
            LikeError::Store(store) => store.into(),
        }
    }
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::InvalidDimensions { .. } | ImageError::Decode(_) => {
                AppError::bad_request(err.to_string())
            }
            ImageError::Encode(_) | ImageError::Worker(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<PinningError> for AppError {
    fn from(err: PinningError) -> Self {
        AppError::upstream(err.to_string())
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::InvalidCid(_) => AppError::bad_request(err.to_string()),
            _ => AppError::upstream(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::bad_request(err.to_string())
    }
}
