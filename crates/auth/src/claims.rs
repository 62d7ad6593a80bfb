use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use adboard_core::UserId;

/// Purpose tag baked into every issued token.
///
/// Tokens are single-purpose: a refresh token cannot authenticate a request
/// and a reset token cannot mint new tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
    Reset,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
            Self::Reset => "reset",
        }
    }
}

/// JWT claims model (transport-agnostic).
///
/// This is the minimal set of claims the service expects once a token has
/// been decoded and its signature verified. Timestamps are unix seconds so
/// they compare directly against `exp`/`iat` as encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the account the token speaks for.
    pub sub: UserId,

    /// What the token may be used for.
    pub kind: TokenKind,

    /// Issued-at, unix seconds.
    pub iat: i64,

    /// Expiration, unix seconds.
    pub exp: i64,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("wrong token kind: expected {expected}, got {actual}")]
    WrongKind {
        expected: &'static str,
        actual: &'static str,
    },
}

/// Deterministically validate decoded claims.
///
/// Note: this validates the *claims* only. Signature verification / decoding
/// happens in the token service before claims ever reach this function.
pub fn validate_claims(
    claims: &JwtClaims,
    expected: TokenKind,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now.timestamp() < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now.timestamp() >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    if claims.kind != expected {
        return Err(TokenValidationError::WrongKind {
            expected: expected.as_str(),
            actual: claims.kind.as_str(),
        });
    }
    Ok(())
}
