use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use adboard_auth::{Action, authorize};
use adboard_core::{AdId, DomainError};
use adboard_infra::PageRequest;
use adboard_listings::{Ad, AdFilter, AdPatch, NewAd};

use crate::app::routes::{comments, common};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_ads).post(create_ad))
        .route(
            "/:id",
            get(get_ad).put(update_ad).patch(update_ad).delete(delete_ad),
        )
        .nest("/:id/comments", comments::router())
}

pub async fn list_ads(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::AdListQuery>,
) -> axum::response::Response {
    let page_number = match common::parse_page(query.page.as_deref()) {
        Ok(page) => page,
        Err(response) => return response,
    };

    let filter = AdFilter {
        search: query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        price_min: query.price_min,
        price_max: query.price_max,
    };

    let page = match services
        .ads
        .list(&filter, PageRequest::new(page_number))
        .await
    {
        Ok(page) => page,
        Err(err) => return errors::domain_error_to_response(err.into()),
    };

    if let Err(response) = common::ensure_page_in_range(page_number, page.total) {
        return response;
    }

    Json(dto::page_to_json(&page, page_number, dto::ad_to_json)).into_response()
}

pub async fn create_ad(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<dto::CreateAdRequest>,
) -> axum::response::Response {
    let author = match current.require_author() {
        Ok(user) => user.id,
        Err(err) => return errors::domain_error_to_response(err),
    };

    let ad = match Ad::create(
        author,
        NewAd {
            title: body.title,
            price: body.price,
            description: body.description,
            image_url: body.image,
        },
    ) {
        Ok(ad) => ad,
        Err(err) => return errors::domain_error_to_response(err),
    };

    if let Err(err) = services.ads.insert(ad.clone()).await {
        return errors::domain_error_to_response(err.into());
    }

    (StatusCode::CREATED, Json(dto::ad_to_json(&ad))).into_response()
}

pub async fn get_ad(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: AdId = match errors::parse_path_id(&id, "ad") {
        Ok(id) => id,
        Err(response) => return response,
    };

    let ad = match services.ads.get(id).await {
        Ok(Some(ad)) => ad,
        Ok(None) => return errors::domain_error_to_response(DomainError::not_found("ad")),
        Err(err) => return errors::domain_error_to_response(err.into()),
    };

    if let Err(err) = authorize(&current.actor(), Action::Read, &ad).require() {
        return errors::domain_error_to_response(err);
    }

    let comments = match services.comments.list_for_ad(id).await {
        Ok(comments) => comments,
        Err(err) => return errors::domain_error_to_response(err.into()),
    };

    Json(dto::ad_detail_to_json(&ad, &comments)).into_response()
}

pub async fn update_ad(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateAdRequest>,
) -> axum::response::Response {
    let id: AdId = match errors::parse_path_id(&id, "ad") {
        Ok(id) => id,
        Err(response) => return response,
    };

    let mut ad = match services.ads.get(id).await {
        Ok(Some(ad)) => ad,
        Ok(None) => return errors::domain_error_to_response(DomainError::not_found("ad")),
        Err(err) => return errors::domain_error_to_response(err.into()),
    };

    if let Err(err) = authorize(&current.actor(), Action::Write, &ad).require() {
        return errors::domain_error_to_response(err);
    }

    let patch = AdPatch {
        title: body.title,
        price: body.price,
        description: body.description,
        image_url: body.image,
    };
    if let Err(err) = ad.apply_patch(patch) {
        return errors::domain_error_to_response(err);
    }

    if let Err(err) = services.ads.update(ad.clone()).await {
        return errors::domain_error_to_response(err.into());
    }

    Json(dto::ad_to_json(&ad)).into_response()
}

pub async fn delete_ad(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: AdId = match errors::parse_path_id(&id, "ad") {
        Ok(id) => id,
        Err(response) => return response,
    };

    let ad = match services.ads.get(id).await {
        Ok(Some(ad)) => ad,
        Ok(None) => return errors::domain_error_to_response(DomainError::not_found("ad")),
        Err(err) => return errors::domain_error_to_response(err.into()),
    };

    if let Err(err) = authorize(&current.actor(), Action::Write, &ad).require() {
        return errors::domain_error_to_response(err);
    }

    match services.ads.delete(id).await {
        Ok(true) => {}
        Ok(false) => return errors::domain_error_to_response(DomainError::not_found("ad")),
        Err(err) => return errors::domain_error_to_response(err.into()),
    }

    // The thread dies with its ad.
    if let Err(err) = services.comments.delete_for_ad(id).await {
        return errors::domain_error_to_response(err.into());
    }

    StatusCode::NO_CONTENT.into_response()
}
