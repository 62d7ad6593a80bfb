use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::Response,
};

use adboard_auth::TokenKind;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::CurrentUser;

#[derive(Clone)]
pub struct AuthState {
    pub services: Arc<AppServices>,
}

/// Resolve the caller before any handler runs.
///
/// No `Authorization` header means an anonymous caller; reads stay open to
/// those. A header that is present but does not carry a live access token for
/// an active account fails the request outright, reads included.
pub async fn auth_context(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let current = match resolve_caller(&state.services, req.headers()).await {
        Ok(current) => current,
        Err(response) => return response,
    };

    req.extensions_mut().insert(current);
    next.run(req).await
}

async fn resolve_caller(
    services: &AppServices,
    headers: &HeaderMap,
) -> Result<CurrentUser, Response> {
    let Some(header) = headers.get(header::AUTHORIZATION) else {
        return Ok(CurrentUser::Anonymous);
    };

    let token = extract_bearer(header.to_str().unwrap_or(""))?;

    let claims = services
        .tokens
        .verify(token, TokenKind::Access)
        .map_err(|_e| unauthorized())?;

    // The token only names the account; the account itself decides whether
    // the caller still exists and is active.
    let user = match services.users.get(claims.sub).await {
        Ok(user) => user,
        Err(err) => return Err(errors::domain_error_to_response(err.into())),
    };

    match user {
        Some(user) if user.active => Ok(CurrentUser::Authenticated(user)),
        _ => Err(unauthorized()),
    }
}

fn extract_bearer(header: &str) -> Result<&str, Response> {
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(unauthorized)?
        .trim();

    if token.is_empty() {
        return Err(unauthorized());
    }

    Ok(token)
}

fn unauthorized() -> Response {
    errors::json_error(
        StatusCode::UNAUTHORIZED,
        "authentication_error",
        "invalid or expired token",
    )
}
