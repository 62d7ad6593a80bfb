use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use adboard_auth::{Action, authorize};
use adboard_core::{AdId, CommentId, DomainError};
use adboard_discussion::{Comment, CommentPatch, NewComment};
use adboard_infra::{PAGE_SIZE, Page, PageRequest};

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_comments).post(create_comment))
        .route(
            "/:comment_id",
            get(get_comment)
                .put(update_comment)
                .patch(update_comment)
                .delete(delete_comment),
        )
}

pub async fn list_comments(
    Extension(services): Extension<Arc<AppServices>>,
    Path(ad_id): Path<String>,
    Query(query): Query<dto::PageQuery>,
) -> axum::response::Response {
    let ad_id: AdId = match errors::parse_path_id(&ad_id, "ad") {
        Ok(id) => id,
        Err(response) => return response,
    };

    let page_number = match common::parse_page(query.page.as_deref()) {
        Ok(page) => page,
        Err(response) => return response,
    };

    match services.ads.get(ad_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return errors::domain_error_to_response(DomainError::not_found("ad")),
        Err(err) => return errors::domain_error_to_response(err.into()),
    }

    let comments = match services.comments.list_for_ad(ad_id).await {
        Ok(comments) => comments,
        Err(err) => return errors::domain_error_to_response(err.into()),
    };

    let total = comments.len() as u64;
    if let Err(response) = common::ensure_page_in_range(page_number, total) {
        return response;
    }

    let request = PageRequest::new(page_number);
    let items = comments
        .into_iter()
        .skip(request.offset() as usize)
        .take(PAGE_SIZE as usize)
        .collect();
    let page = Page { items, total };

    Json(dto::page_to_json(&page, page_number, dto::comment_to_json)).into_response()
}

pub async fn create_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(ad_id): Path<String>,
    Json(body): Json<dto::CreateCommentRequest>,
) -> axum::response::Response {
    let ad_id: AdId = match errors::parse_path_id(&ad_id, "ad") {
        Ok(id) => id,
        Err(response) => return response,
    };

    let author = match current.require_author() {
        Ok(user) => user.id,
        Err(err) => return errors::domain_error_to_response(err),
    };

    match services.ads.get(ad_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return errors::domain_error_to_response(DomainError::not_found("ad")),
        Err(err) => return errors::domain_error_to_response(err.into()),
    }

    let comment = match Comment::create(ad_id, author, NewComment { text: body.text }) {
        Ok(comment) => comment,
        Err(err) => return errors::domain_error_to_response(err),
    };

    if let Err(err) = services.comments.insert(comment.clone()).await {
        return errors::domain_error_to_response(err.into());
    }

    (StatusCode::CREATED, Json(dto::comment_to_json(&comment))).into_response()
}

pub async fn get_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path((ad_id, comment_id)): Path<(String, String)>,
) -> axum::response::Response {
    let (ad_id, comment_id) = match parse_comment_path(&ad_id, &comment_id) {
        Ok(ids) => ids,
        Err(response) => return response,
    };

    let comment = match services.comments.get(ad_id, comment_id).await {
        Ok(Some(comment)) => comment,
        Ok(None) => return errors::domain_error_to_response(DomainError::not_found("comment")),
        Err(err) => return errors::domain_error_to_response(err.into()),
    };

    if let Err(err) = authorize(&current.actor(), Action::Read, &comment).require() {
        return errors::domain_error_to_response(err);
    }

    Json(dto::comment_to_json(&comment)).into_response()
}

pub async fn update_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path((ad_id, comment_id)): Path<(String, String)>,
    Json(body): Json<dto::UpdateCommentRequest>,
) -> axum::response::Response {
    let (ad_id, comment_id) = match parse_comment_path(&ad_id, &comment_id) {
        Ok(ids) => ids,
        Err(response) => return response,
    };

    let mut comment = match services.comments.get(ad_id, comment_id).await {
        Ok(Some(comment)) => comment,
        Ok(None) => return errors::domain_error_to_response(DomainError::not_found("comment")),
        Err(err) => return errors::domain_error_to_response(err.into()),
    };

    if let Err(err) = authorize(&current.actor(), Action::Write, &comment).require() {
        return errors::domain_error_to_response(err);
    }

    if let Err(err) = comment.apply_patch(CommentPatch { text: body.text }) {
        return errors::domain_error_to_response(err);
    }

    if let Err(err) = services.comments.update(comment.clone()).await {
        return errors::domain_error_to_response(err.into());
    }

    Json(dto::comment_to_json(&comment)).into_response()
}

pub async fn delete_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path((ad_id, comment_id)): Path<(String, String)>,
) -> axum::response::Response {
    let (ad_id, comment_id) = match parse_comment_path(&ad_id, &comment_id) {
        Ok(ids) => ids,
        Err(response) => return response,
    };

    let comment = match services.comments.get(ad_id, comment_id).await {
        Ok(Some(comment)) => comment,
        Ok(None) => return errors::domain_error_to_response(DomainError::not_found("comment")),
        Err(err) => return errors::domain_error_to_response(err.into()),
    };

    if let Err(err) = authorize(&current.actor(), Action::Write, &comment).require() {
        return errors::domain_error_to_response(err);
    }

    match services.comments.delete(ad_id, comment_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::domain_error_to_response(DomainError::not_found("comment")),
        Err(err) => errors::domain_error_to_response(err.into()),
    }
}

fn parse_comment_path(
    ad_id: &str,
    comment_id: &str,
) -> Result<(AdId, CommentId), axum::response::Response> {
    let ad_id = errors::parse_path_id(ad_id, "ad")?;
    let comment_id = errors::parse_path_id(comment_id, "comment")?;
    Ok((ad_id, comment_id))
}
