//! HTTP surface for the classifieds service.

pub mod app;
pub mod context;
pub mod middleware;
