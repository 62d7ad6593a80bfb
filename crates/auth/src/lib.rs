//! `adboard-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod engine;
pub mod password;
pub mod tokens;

pub use claims::{JwtClaims, TokenKind, TokenValidationError, validate_claims};
pub use engine::{Action, Actor, Decision, DenyReason, Owned, authorize, authorize_create};
pub use password::{Argon2Hasher, PasswordError, PasswordHasher, check_strength};
pub use tokens::{Hs256TokenService, TokenError, TokenPair, TokenService};
