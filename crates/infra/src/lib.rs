//! Infrastructure layer: persistent stores for accounts, ads, and comments.

pub mod store;

pub use store::{
    AdStore, CommentStore, InMemoryAdStore, InMemoryCommentStore, InMemoryUserStore, PAGE_SIZE,
    Page, PageRequest, PostgresAdStore, PostgresCommentStore, PostgresUserStore, StoreError,
    StoreResult, UserStore, ensure_schema,
};
