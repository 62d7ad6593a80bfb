use std::sync::Arc;

use axum::{Json, Router, extract::Extension, response::IntoResponse, routing::post};
use serde_json::json;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(obtain_pair))
        .route("/refresh", post(refresh))
}

pub async fn obtain_pair(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ObtainTokenRequest>,
) -> axum::response::Response {
    match services.login(&body.email, &body.password).await {
        Ok(pair) => Json(json!({
            "access": pair.access,
            "refresh": pair.refresh,
        }))
        .into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RefreshTokenRequest>,
) -> axum::response::Response {
    match services.refresh_access(&body.refresh).await {
        Ok(access) => Json(json!({ "access": access })).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}
