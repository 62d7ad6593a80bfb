//! HTTP API application wiring (Axum router + service wiring).
//!
//! The folder is structured like:
//! - `services.rs`: service wiring (stores, tokens, password hashing)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses
//! - `mail.rs`: outbound mail boundary (log-backed in development)

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod mail;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(jwt_secret: String) -> Router {
    let services = Arc::new(services::build_services(jwt_secret.as_bytes()).await);
    build_app_with(services)
}

/// Wire the router around an explicit service set (tests seed their own).
pub fn build_app_with(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        services: services.clone(),
    };

    // Caller resolution runs on every /api route; individual handlers decide
    // what anonymous callers may do.
    let api = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_context,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", api)
        .layer(ServiceBuilder::new())
}

pub use services::AppServices;
