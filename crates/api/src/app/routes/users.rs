use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use adboard_identity::{NewUser, UserPatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/me", get(me).put(update_me).patch(update_me))
        .route("/reset_password", post(reset_password))
        .route("/reset_password_confirm", post(reset_password_confirm))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    let input = NewUser {
        email: body.email,
        first_name: body.first_name,
        last_name: body.last_name,
        phone: body.phone,
    };

    match services.register_user(input, &body.password).await {
        Ok(user) => (StatusCode::CREATED, Json(dto::user_to_json(&user))).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn me(Extension(current): Extension<CurrentUser>) -> axum::response::Response {
    match current.require() {
        Ok(user) => Json(dto::user_to_json(user)).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn update_me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<dto::UpdateProfileRequest>,
) -> axum::response::Response {
    let user = match current.require() {
        Ok(user) => user,
        Err(err) => return errors::domain_error_to_response(err),
    };

    let patch = UserPatch {
        first_name: body.first_name,
        last_name: body.last_name,
        phone: body.phone,
        image_url: body.image,
    };

    match services.update_profile(user, patch).await {
        Ok(updated) => Json(dto::user_to_json(&updated)).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}

pub async fn reset_password(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::PasswordResetRequest>,
) -> axum::response::Response {
    if let Err(err) = services.request_password_reset(&body.email).await {
        return errors::domain_error_to_response(err);
    }

    Json(json!({
        "detail": "if the account exists, reset instructions have been sent",
    }))
    .into_response()
}

pub async fn reset_password_confirm(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::PasswordResetConfirmRequest>,
) -> axum::response::Response {
    match services
        .confirm_password_reset(&body.uid, &body.token, &body.new_password)
        .await
    {
        Ok(()) => Json(json!({ "detail": "password has been reset" })).into_response(),
        Err(err) => errors::domain_error_to_response(err),
    }
}
