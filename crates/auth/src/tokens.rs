//! Token issuance and verification (HS256 JWTs).

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use adboard_core::UserId;

use crate::claims::{JwtClaims, TokenKind, TokenValidationError, validate_claims};

const ACCESS_TTL_SECS: i64 = 15 * 60;
const REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;
const RESET_TTL_SECS: i64 = 60 * 60;

fn ttl_secs(kind: TokenKind) -> i64 {
    match kind {
        TokenKind::Access => ACCESS_TTL_SECS,
        TokenKind::Refresh => REFRESH_TTL_SECS,
        TokenKind::Reset => RESET_TTL_SECS,
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token encoding failed: {0}")]
    Encode(jsonwebtoken::errors::Error),

    #[error("token is invalid: {0}")]
    Decode(jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// The access + refresh pair handed out by the token endpoint.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Issues and verifies the service's bearer tokens.
pub trait TokenService: Send + Sync {
    /// Issue a token of `kind` for `user`.
    fn issue(&self, user: UserId, kind: TokenKind) -> Result<String, TokenError>;

    /// Verify `token`, requiring it to be of `kind`, and return its claims.
    fn verify(&self, token: &str, kind: TokenKind) -> Result<JwtClaims, TokenError>;

    /// Issue the access + refresh pair handed out at login.
    fn issue_pair(&self, user: UserId) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access: self.issue(user, TokenKind::Access)?,
            refresh: self.issue(user, TokenKind::Refresh)?,
        })
    }
}

/// HS256 implementation over a shared secret.
pub struct Hs256TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256TokenService {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

impl TokenService for Hs256TokenService {
    fn issue(&self, user: UserId, kind: TokenKind) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = JwtClaims {
            sub: user,
            kind,
            iat: now,
            exp: now + ttl_secs(kind),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Encode)
    }

    fn verify(&self, token: &str, kind: TokenKind) -> Result<JwtClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry and kind are checked by validate_claims so the rules live in
        // one deterministic place.
        validation.validate_exp = false;
        validation.leeway = 0;
        let data =
            decode::<JwtClaims>(token, &self.decoding, &validation).map_err(TokenError::Decode)?;
        validate_claims(&data.claims, kind, Utc::now())?;
        Ok(data.claims)
    }
}
