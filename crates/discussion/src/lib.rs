//! Discussion domain module.
//!
//! Business rules for comments attached to listings, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod comment;

pub use comment::{Comment, CommentPatch, NewComment};
