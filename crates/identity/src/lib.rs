//! Accounts domain module.
//!
//! Business rules for registered accounts, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod user;

pub use user::{NewUser, Role, User, UserPatch};
