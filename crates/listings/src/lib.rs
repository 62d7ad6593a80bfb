//! Listings domain module.
//!
//! Business rules for classified ads, implemented purely as deterministic
//! domain logic (no IO, no HTTP, no storage).

pub mod ad;

pub use ad::{Ad, AdFilter, AdPatch, NewAd};
