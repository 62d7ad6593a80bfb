//! Application service wiring: stores, token service, password hashing.

use std::sync::Arc;

use sqlx::PgPool;

use adboard_auth::{
    Argon2Hasher, Hs256TokenService, PasswordError, PasswordHasher, TokenError, TokenKind,
    TokenPair, TokenService, check_strength,
};
use adboard_core::{DomainError, DomainResult};
use adboard_identity::{NewUser, User, UserPatch};
use adboard_infra::{
    AdStore, CommentStore, InMemoryAdStore, InMemoryCommentStore, InMemoryUserStore,
    PostgresAdStore, PostgresCommentStore, PostgresUserStore, UserStore, ensure_schema,
};

use crate::app::mail::{Mailer, TracingMailer};

/// Everything the HTTP layer needs, behind storage-agnostic traits.
pub struct AppServices {
    pub users: Arc<dyn UserStore>,
    pub ads: Arc<dyn AdStore>,
    pub comments: Arc<dyn CommentStore>,
    pub tokens: Arc<dyn TokenService>,
    hasher: Arc<dyn PasswordHasher>,
    mailer: Arc<dyn Mailer>,
    frontend_url: String,
    dummy_hash: String,
}

impl AppServices {
    pub fn new(
        users: Arc<dyn UserStore>,
        ads: Arc<dyn AdStore>,
        comments: Arc<dyn CommentStore>,
        jwt_secret: &[u8],
    ) -> Self {
        let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
        // Hash an arbitrary string once so login can burn the same work on
        // unknown emails as on known ones.
        let dummy_hash = hasher
            .hash("adboard-login-timing-pad")
            .expect("argon2 self-check failed");

        Self {
            users,
            ads,
            comments,
            tokens: Arc::new(Hs256TokenService::new(jwt_secret)),
            hasher,
            mailer: Arc::new(TracingMailer),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            dummy_hash,
        }
    }

    /// Register a regular account.
    pub async fn register_user(&self, input: NewUser, password: &str) -> DomainResult<User> {
        check_strength(password)?;
        let hash = self.hasher.hash(password).map_err(hash_failure)?;
        let user = User::register(input, hash)?;
        self.users.insert(user.clone()).await?;
        Ok(user)
    }

    /// Create the admin account, or promote an existing account under the
    /// same email and rotate its password. Returns whether a new account was
    /// created.
    pub async fn bootstrap_admin(&self, input: NewUser, password: &str) -> DomainResult<bool> {
        check_strength(password)?;

        if let Some(mut user) = self.users.find_by_email(&input.email).await? {
            let hash = self.hasher.hash(password).map_err(hash_failure)?;
            user.set_password_hash(hash);
            user.grant_admin();
            self.users.update(user).await?;
            return Ok(false);
        }

        let hash = self.hasher.hash(password).map_err(hash_failure)?;
        let user = User::register_admin(input, hash, None, None)?;
        self.users.insert(user).await?;
        Ok(true)
    }

    /// Verify an email/password pair without leaking which half was wrong.
    pub async fn authenticate(&self, email: &str, password: &str) -> DomainResult<User> {
        match self.users.find_by_email(email).await? {
            Some(user) if user.active => {
                if self.hasher.verify(password, &user.password_hash) {
                    Ok(user)
                } else {
                    Err(bad_credentials())
                }
            }
            _ => {
                // Unknown or inactive account: verify against a throwaway
                // hash so both outcomes cost the same.
                let _ = self.hasher.verify(password, &self.dummy_hash);
                Err(bad_credentials())
            }
        }
    }

    /// Log in and mint the access + refresh pair.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<TokenPair> {
        let user = self.authenticate(email, password).await?;
        self.tokens.issue_pair(user.id).map_err(token_failure)
    }

    /// Exchange a refresh token for a fresh access token. The subject must
    /// still resolve to an active account.
    pub async fn refresh_access(&self, refresh: &str) -> DomainResult<String> {
        let claims = self
            .tokens
            .verify(refresh, TokenKind::Refresh)
            .map_err(|_e| stale_refresh())?;

        match self.users.get(claims.sub).await? {
            Some(user) if user.active => self
                .tokens
                .issue(user.id, TokenKind::Access)
                .map_err(token_failure),
            _ => Err(stale_refresh()),
        }
    }

    /// Update the caller's own profile.
    pub async fn update_profile(&self, user: &User, patch: UserPatch) -> DomainResult<User> {
        let mut updated = user.clone();
        updated.apply_patch(patch)?;
        self.users.update(updated.clone()).await?;
        Ok(updated)
    }

    /// Start a password reset. The outcome is indistinguishable whether the
    /// address is registered or not; known addresses get a reset link by
    /// mail.
    pub async fn request_password_reset(&self, email: &str) -> DomainResult<()> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Ok(());
        };

        let token = self
            .tokens
            .issue(user.id, TokenKind::Reset)
            .map_err(token_failure)?;
        let link = format!("{}/reset-password/{}/{}", self.frontend_url, user.id, token);
        self.mailer.send(
            &user.email,
            "Password reset",
            &format!("Follow the link to reset your password: {link}"),
        );
        Ok(())
    }

    /// Complete a password reset. The token must be a live reset token whose
    /// subject matches `uid`.
    pub async fn confirm_password_reset(
        &self,
        uid: &str,
        token: &str,
        new_password: &str,
    ) -> DomainResult<()> {
        let uid = uid.parse().map_err(|_e| bad_reset_link())?;
        let claims = self
            .tokens
            .verify(token, TokenKind::Reset)
            .map_err(|_e| bad_reset_link())?;
        if claims.sub != uid {
            return Err(bad_reset_link());
        }

        check_strength(new_password)?;

        let Some(mut user) = self.users.get(uid).await? else {
            return Err(bad_reset_link());
        };
        let hash = self.hasher.hash(new_password).map_err(hash_failure)?;
        user.set_password_hash(hash);
        self.users.update(user).await?;
        Ok(())
    }
}

fn bad_credentials() -> DomainError {
    DomainError::unauthenticated("no active account found with the given credentials")
}

fn stale_refresh() -> DomainError {
    DomainError::unauthenticated("refresh token is invalid or expired")
}

fn bad_reset_link() -> DomainError {
    DomainError::validation("the reset link is invalid or has expired")
}

fn token_failure(err: TokenError) -> DomainError {
    DomainError::store(format!("token issuance failed: {err}"))
}

fn hash_failure(err: PasswordError) -> DomainError {
    DomainError::store(format!("password hashing failed: {err}"))
}

/// Build the production service set.
///
/// `USE_PERSISTENT_STORES=true` selects the Postgres-backed stores (requires
/// `DATABASE_URL`); anything else runs on the in-memory stores.
pub async fn build_services(jwt_secret: &[u8]) -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    if use_persistent {
        build_persistent(jwt_secret).await
    } else {
        build_in_memory(jwt_secret)
    }
}

pub fn build_in_memory(jwt_secret: &[u8]) -> AppServices {
    AppServices::new(
        Arc::new(InMemoryUserStore::new()),
        Arc::new(InMemoryAdStore::new()),
        Arc::new(InMemoryCommentStore::new()),
        jwt_secret,
    )
}

async fn build_persistent(jwt_secret: &[u8]) -> AppServices {
    let url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");
    let pool = PgPool::connect(&url)
        .await
        .expect("failed to connect to Postgres");
    ensure_schema(&pool)
        .await
        .expect("failed to prepare database schema");

    AppServices::new(
        Arc::new(PostgresUserStore::new(pool.clone())),
        Arc::new(PostgresAdStore::new(pool.clone())),
        Arc::new(PostgresCommentStore::new(pool)),
        jwt_secret,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn services() -> AppServices {
        build_in_memory(b"test-secret")
    }

    fn signup(n: u32) -> NewUser {
        NewUser {
            email: format!("user{n}@example.com"),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            phone: "+15550000000".to_string(),
        }
    }

    #[tokio::test]
    async fn register_then_login_round_trips() {
        let services = services();
        services
            .register_user(signup(1), "correct horse")
            .await
            .unwrap();

        let pair = services
            .login("user1@example.com", "correct horse")
            .await
            .unwrap();
        assert!(!pair.access.is_empty());
        assert!(!pair.refresh.is_empty());
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let services = services();
        services
            .register_user(signup(1), "correct horse")
            .await
            .unwrap();

        let wrong_password = services
            .login("user1@example.com", "wrong password")
            .await
            .unwrap_err();
        let unknown_email = services
            .login("nobody@example.com", "wrong password")
            .await
            .unwrap_err();
        assert_eq!(wrong_password, unknown_email);
    }

    #[tokio::test]
    async fn duplicate_registration_is_a_validation_error() {
        let services = services();
        services
            .register_user(signup(1), "correct horse")
            .await
            .unwrap();

        let err = services
            .register_user(signup(1), "another pass")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        // The original account is untouched; no second credential exists.
        services
            .login("user1@example.com", "correct horse")
            .await
            .unwrap();
        assert!(
            services
                .login("user1@example.com", "another pass")
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn refresh_rejects_access_tokens() {
        let services = services();
        services
            .register_user(signup(1), "correct horse")
            .await
            .unwrap();
        let pair = services
            .login("user1@example.com", "correct horse")
            .await
            .unwrap();

        let access = services.refresh_access(&pair.refresh).await.unwrap();
        assert!(!access.is_empty());

        let err = services.refresh_access(&pair.access).await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn refresh_stops_for_deactivated_accounts() {
        let services = services();
        let mut user = services
            .register_user(signup(1), "correct horse")
            .await
            .unwrap();
        let pair = services
            .login("user1@example.com", "correct horse")
            .await
            .unwrap();

        user.active = false;
        services.users.update(user).await.unwrap();

        let err = services.refresh_access(&pair.refresh).await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn password_reset_rotates_the_credential() {
        let services = services();
        let user = services
            .register_user(signup(1), "old password")
            .await
            .unwrap();

        services
            .request_password_reset("user1@example.com")
            .await
            .unwrap();
        // Unknown addresses take the same path and succeed the same way.
        services
            .request_password_reset("nobody@example.com")
            .await
            .unwrap();

        let token = services.tokens.issue(user.id, TokenKind::Reset).unwrap();
        services
            .confirm_password_reset(&user.id.to_string(), &token, "new password!")
            .await
            .unwrap();

        assert!(
            services
                .login("user1@example.com", "old password")
                .await
                .is_err()
        );
        services
            .login("user1@example.com", "new password!")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reset_confirm_requires_matching_subject() {
        let services = services();
        let user = services
            .register_user(signup(1), "password one")
            .await
            .unwrap();
        let other = services
            .register_user(signup(2), "password two")
            .await
            .unwrap();

        let token = services.tokens.issue(user.id, TokenKind::Reset).unwrap();
        let err = services
            .confirm_password_reset(&other.id.to_string(), &token, "new password!")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn reset_confirm_rejects_non_reset_tokens() {
        let services = services();
        let user = services
            .register_user(signup(1), "password one")
            .await
            .unwrap();

        let access = services.tokens.issue(user.id, TokenKind::Access).unwrap();
        let err = services
            .confirm_password_reset(&user.id.to_string(), &access, "new password!")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn bootstrap_admin_creates_then_promotes() {
        let services = services();

        let created = services.bootstrap_admin(signup(9), "admin-pass").await.unwrap();
        assert!(created);

        let again = services
            .bootstrap_admin(signup(9), "rotated-pass")
            .await
            .unwrap();
        assert!(!again);

        let user = services
            .users
            .find_by_email("user9@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(user.is_admin());
        assert!(user.staff);
        assert!(user.superuser);

        services
            .login("user9@example.com", "rotated-pass")
            .await
            .unwrap();
    }
}
