/// Shared JWT validation module for Grid Bot services
///
/// Tokens are HS256-signed with a shared secret (`TOKEN_SECRET`). The only
/// application claim the services read is `signature`: a wallet signature over
/// the login challenge, checked by the auth middleware when a caller asserts a
/// wallet address.
///
/// ## Usage
///
/// ```rust
/// use crypto_core::jwt::{Claims, JwtKeys};
///
/// let keys = JwtKeys::from_secret("a-long-deployment-secret").unwrap();
/// let token = keys.issue(&Claims::default()).unwrap();
/// assert!(keys.validate(&token).is_ok());
/// ```
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT algorithm used by every Grid Bot token
const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT secret must not be empty")]
    EmptySecret,

    #[error("failed to sign token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("token validation failed: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Claims carried by Grid Bot bearer tokens
///
/// Every registered claim is optional: the issuing frontend only guarantees
/// `signature`, and `exp` is enforced whenever it is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Hex `personal_sign` signature over the challenge message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Signing and verification keys derived from one shared secret
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys").finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn from_secret(secret: &str) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::EmptySecret);
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Sign `claims` into a compact token
    pub fn issue(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(JWT_ALGORITHM), claims, &self.encoding).map_err(JwtError::Encode)
    }

    /// Verify the HS256 signature and (when present) the expiry of `token`
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.required_spec_claims.clear();
        validation.validate_exp = true;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(JwtError::Invalid)
    }
}
