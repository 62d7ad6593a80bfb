use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use adboard_core::DomainError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::Unauthenticated(msg) => {
            json_error(StatusCode::UNAUTHORIZED, "authentication_error", msg)
        }
        DomainError::PermissionDenied(msg) => {
            json_error(StatusCode::FORBIDDEN, "permission_denied", msg)
        }
        DomainError::NotFound(resource) => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("{resource} not found"),
        ),
        DomainError::InvariantViolation(msg) => {
            tracing::error!(error = %msg, "invariant violation reached the http surface");
            internal_error()
        }
        DomainError::Store(msg) => {
            tracing::error!(error = %msg, "store failure");
            internal_error()
        }
    }
}

fn internal_error() -> axum::response::Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "internal server error",
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Parse an id taken from the request path. A malformed id reads as a miss:
/// a typed route would simply never have matched it.
pub fn parse_path_id<T: std::str::FromStr>(
    raw: &str,
    resource: &'static str,
) -> Result<T, axum::response::Response> {
    raw.parse().map_err(|_| {
        json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("{resource} not found"),
        )
    })
}
