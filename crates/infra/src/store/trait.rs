use thiserror::Error;

use adboard_core::{AdId, CommentId, DomainError, UserId};
use adboard_discussion::Comment;
use adboard_identity::User;
use adboard_listings::{Ad, AdFilter};

/// Items per page for paginated listings.
pub const PAGE_SIZE: u32 = 4;

/// Store operation error.
///
/// These are **infrastructure errors** (constraint violations, connectivity,
/// locks) as opposed to domain errors (validation, permissions).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated. The message is caller-facing.
    #[error("{0}")]
    Duplicate(String),

    /// The backing storage failed.
    #[error("storage failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(msg) => DomainError::validation(msg),
            StoreError::Backend(msg) => DomainError::store(msg),
        }
    }
}

/// 1-based page selector. Page size is fixed at [`PAGE_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
}

impl PageRequest {
    /// Clamps `page` to at least 1.
    pub fn new(page: u32) -> Self {
        Self { page: page.max(1) }
    }

    /// Items skipped before this page starts.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(PAGE_SIZE)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1 }
    }
}

/// One page of results plus the total number of matches across all pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Account storage. Emails arrive lowercased and must stay unique.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new account. Fails with [`StoreError::Duplicate`] when the
    /// email is already registered.
    async fn insert(&self, user: User) -> StoreResult<()>;

    /// Replace an existing account. The account must already be present.
    async fn update(&self, user: User) -> StoreResult<()>;

    async fn get(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Case-insensitive email lookup.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}

/// Ad storage. Listing order is newest first.
#[async_trait::async_trait]
pub trait AdStore: Send + Sync {
    async fn insert(&self, ad: Ad) -> StoreResult<()>;

    /// Replace an existing ad. The ad must already be present.
    async fn update(&self, ad: Ad) -> StoreResult<()>;

    async fn get(&self, id: AdId) -> StoreResult<Option<Ad>>;

    /// Remove an ad. Returns whether it existed. Comments under the ad are
    /// cleaned up separately via [`CommentStore::delete_for_ad`].
    async fn delete(&self, id: AdId) -> StoreResult<bool>;

    /// One page of ads matching `filter`, newest first, plus the total match
    /// count. Out-of-range pages yield an empty item list.
    async fn list(&self, filter: &AdFilter, page: PageRequest) -> StoreResult<Page<Ad>>;
}

/// Comment storage. Comments are scoped to their ad: lookups that name the
/// wrong ad miss even when the comment id exists.
#[async_trait::async_trait]
pub trait CommentStore: Send + Sync {
    async fn insert(&self, comment: Comment) -> StoreResult<()>;

    /// Replace an existing comment. The comment must already be present.
    async fn update(&self, comment: Comment) -> StoreResult<()>;

    async fn get(&self, ad: AdId, id: CommentId) -> StoreResult<Option<Comment>>;

    async fn delete(&self, ad: AdId, id: CommentId) -> StoreResult<bool>;

    /// All comments under an ad, newest first. Unknown ads yield an empty
    /// list; existence checks happen at the surface.
    async fn list_for_ad(&self, ad: AdId) -> StoreResult<Vec<Comment>>;

    /// Remove every comment under an ad.
    async fn delete_for_ad(&self, ad: AdId) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_clamps_to_first_page() {
        assert_eq!(PageRequest::new(0).page, 1);
        assert_eq!(PageRequest::new(3).page, 3);
    }

    #[test]
    fn offsets_step_by_page_size() {
        assert_eq!(PageRequest::new(1).offset(), 0);
        assert_eq!(PageRequest::new(2).offset(), u64::from(PAGE_SIZE));
        assert_eq!(PageRequest::new(5).offset(), 4 * u64::from(PAGE_SIZE));
    }

    #[test]
    fn duplicate_errors_surface_as_validation() {
        let err: DomainError = StoreError::Duplicate("email already registered".to_string()).into();
        assert!(matches!(err, DomainError::Validation(_)));

        let err: DomainError = StoreError::Backend("connection reset".to_string()).into();
        assert!(matches!(err, DomainError::Store(_)));
    }
}
