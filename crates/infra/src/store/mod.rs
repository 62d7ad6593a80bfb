//! Persistent store boundary.
//!
//! This module defines storage-agnostic traits for accounts, ads, and
//! comments, with in-memory implementations for tests/dev and Postgres-backed
//! ones for production.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::{InMemoryAdStore, InMemoryCommentStore, InMemoryUserStore};
pub use postgres::{PostgresAdStore, PostgresCommentStore, PostgresUserStore, ensure_schema};
pub use r#trait::{
    AdStore, CommentStore, PAGE_SIZE, Page, PageRequest, StoreError, StoreResult, UserStore,
};
