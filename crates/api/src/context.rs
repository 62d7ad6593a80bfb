use adboard_auth::{Actor, authorize_create};
use adboard_core::{DomainError, DomainResult};
use adboard_identity::User;

/// The caller of the current request, resolved once by the auth middleware.
///
/// Present on every `/api` route: anonymous when no credentials were offered,
/// otherwise the account loaded fresh for this request.
#[derive(Debug, Clone)]
pub enum CurrentUser {
    Anonymous,
    Authenticated(User),
}

impl CurrentUser {
    /// The authorization engine's view of this caller.
    pub fn actor(&self) -> Actor {
        match self {
            Self::Anonymous => Actor::Anonymous,
            Self::Authenticated(user) if user.is_admin() => Actor::admin(user.id),
            Self::Authenticated(user) => Actor::user(user.id),
        }
    }

    /// The authenticated account behind the request, or the 401 that every
    /// login-only endpoint hands out.
    pub fn require(&self) -> DomainResult<&User> {
        match self {
            Self::Anonymous => Err(DomainError::unauthenticated(
                "authentication credentials were not provided",
            )),
            Self::Authenticated(user) => Ok(user),
        }
    }

    /// The account allowed to author new content, per the creation gate.
    pub fn require_author(&self) -> DomainResult<&User> {
        authorize_create(&self.actor()).require()?;
        self.require()
    }
}
