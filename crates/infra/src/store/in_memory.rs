use std::collections::HashMap;
use std::sync::RwLock;

use adboard_core::{AdId, CommentId, UserId};
use adboard_discussion::Comment;
use adboard_identity::User;
use adboard_listings::{Ad, AdFilter};

use super::r#trait::{
    AdStore, CommentStore, PAGE_SIZE, Page, PageRequest, StoreError, StoreResult, UserStore,
};

fn lock_poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

/// In-memory account store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: User) -> StoreResult<()> {
        let mut users = self.users.write().map_err(|_| lock_poisoned())?;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(
                "a user with this email already exists".to_string(),
            ));
        }
        users.insert(user.id, user);
        Ok(())
    }

    async fn update(&self, user: User) -> StoreResult<()> {
        let mut users = self.users.write().map_err(|_| lock_poisoned())?;
        if users.values().any(|u| u.id != user.id && u.email == user.email) {
            return Err(StoreError::Duplicate(
                "a user with this email already exists".to_string(),
            ));
        }
        match users.get_mut(&user.id) {
            Some(slot) => {
                *slot = user;
                Ok(())
            }
            None => Err(StoreError::Backend(format!(
                "update of missing user {}",
                user.id
            ))),
        }
    }

    async fn get(&self, id: UserId) -> StoreResult<Option<User>> {
        let users = self.users.read().map_err(|_| lock_poisoned())?;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let needle = email.trim().to_lowercase();
        let users = self.users.read().map_err(|_| lock_poisoned())?;
        Ok(users.values().find(|u| u.email == needle).cloned())
    }
}

/// In-memory ad store.
#[derive(Debug, Default)]
pub struct InMemoryAdStore {
    ads: RwLock<HashMap<AdId, Ad>>,
}

impl InMemoryAdStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AdStore for InMemoryAdStore {
    async fn insert(&self, ad: Ad) -> StoreResult<()> {
        let mut ads = self.ads.write().map_err(|_| lock_poisoned())?;
        ads.insert(ad.id, ad);
        Ok(())
    }

    async fn update(&self, ad: Ad) -> StoreResult<()> {
        let mut ads = self.ads.write().map_err(|_| lock_poisoned())?;
        match ads.get_mut(&ad.id) {
            Some(slot) => {
                *slot = ad;
                Ok(())
            }
            None => Err(StoreError::Backend(format!(
                "update of missing ad {}",
                ad.id
            ))),
        }
    }

    async fn get(&self, id: AdId) -> StoreResult<Option<Ad>> {
        let ads = self.ads.read().map_err(|_| lock_poisoned())?;
        Ok(ads.get(&id).cloned())
    }

    async fn delete(&self, id: AdId) -> StoreResult<bool> {
        let mut ads = self.ads.write().map_err(|_| lock_poisoned())?;
        Ok(ads.remove(&id).is_some())
    }

    async fn list(&self, filter: &AdFilter, page: PageRequest) -> StoreResult<Page<Ad>> {
        let ads = self.ads.read().map_err(|_| lock_poisoned())?;
        let mut matched: Vec<Ad> = ads
            .values()
            .filter(|ad| filter.matches(ad))
            .cloned()
            .collect();
        // Newest first; ties broken by id so page windows stay stable.
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(PAGE_SIZE as usize)
            .collect();
        Ok(Page { items, total })
    }
}

/// In-memory comment store.
#[derive(Debug, Default)]
pub struct InMemoryCommentStore {
    comments: RwLock<HashMap<CommentId, Comment>>,
}

impl InMemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CommentStore for InMemoryCommentStore {
    async fn insert(&self, comment: Comment) -> StoreResult<()> {
        let mut comments = self.comments.write().map_err(|_| lock_poisoned())?;
        comments.insert(comment.id, comment);
        Ok(())
    }

    async fn update(&self, comment: Comment) -> StoreResult<()> {
        let mut comments = self.comments.write().map_err(|_| lock_poisoned())?;
        match comments.get_mut(&comment.id) {
            Some(slot) => {
                *slot = comment;
                Ok(())
            }
            None => Err(StoreError::Backend(format!(
                "update of missing comment {}",
                comment.id
            ))),
        }
    }

    async fn get(&self, ad: AdId, id: CommentId) -> StoreResult<Option<Comment>> {
        let comments = self.comments.read().map_err(|_| lock_poisoned())?;
        Ok(comments.get(&id).filter(|c| c.ad == ad).cloned())
    }

    async fn delete(&self, ad: AdId, id: CommentId) -> StoreResult<bool> {
        let mut comments = self.comments.write().map_err(|_| lock_poisoned())?;
        match comments.get(&id) {
            Some(c) if c.ad == ad => {
                comments.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_for_ad(&self, ad: AdId) -> StoreResult<Vec<Comment>> {
        let comments = self.comments.read().map_err(|_| lock_poisoned())?;
        let mut under_ad: Vec<Comment> =
            comments.values().filter(|c| c.ad == ad).cloned().collect();
        under_ad.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(under_ad)
    }

    async fn delete_for_ad(&self, ad: AdId) -> StoreResult<()> {
        let mut comments = self.comments.write().map_err(|_| lock_poisoned())?;
        comments.retain(|_, c| c.ad != ad);
        Ok(())
    }
}
