use axum::Router;

pub mod ads;
pub mod comments;
pub mod common;
pub mod system;
pub mod tokens;
pub mod users;

/// Router for everything under `/api`.
pub fn router() -> Router {
    Router::new()
        .nest("/users", users::router())
        .nest("/token", tokens::router())
        .nest("/ads", ads::router())
}
