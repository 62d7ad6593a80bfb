use serde::Deserialize;
use serde_json::json;

use adboard_discussion::Comment;
use adboard_identity::User;
use adboard_infra::{PAGE_SIZE, Page};
use adboard_listings::Ad;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ObtainTokenRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirmRequest {
    pub uid: String,
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateAdRequest {
    pub title: String,
    pub price: u64,
    pub description: String,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAdRequest {
    pub title: Option<String>,
    pub price: Option<u64>,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdListQuery {
    pub page: Option<String>,
    pub search: Option<String>,
    pub price_min: Option<u64>,
    pub price_max: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub text: Option<String>,
}

// -------------------------
// Response mapping
// -------------------------

pub fn user_to_json(user: &User) -> serde_json::Value {
    json!({
        "id": user.id.to_string(),
        "first_name": user.first_name,
        "last_name": user.last_name,
        "phone": user.phone,
        "email": user.email,
        "role": user.role.as_str(),
        "image": user.image_url,
    })
}

pub fn ad_to_json(ad: &Ad) -> serde_json::Value {
    json!({
        "id": ad.id.to_string(),
        "title": ad.title,
        "price": ad.price,
        "description": ad.description,
        "author": ad.author.to_string(),
        "image": ad.image_url,
        "created_at": ad.created_at.to_rfc3339(),
    })
}

/// Detail view of an ad: the ad plus its full comment thread, newest first.
pub fn ad_detail_to_json(ad: &Ad, comments: &[Comment]) -> serde_json::Value {
    let mut value = ad_to_json(ad);
    value["comments"] = comments
        .iter()
        .map(comment_to_json)
        .collect::<Vec<_>>()
        .into();
    value
}

pub fn comment_to_json(comment: &Comment) -> serde_json::Value {
    json!({
        "id": comment.id.to_string(),
        "text": comment.text,
        "author": comment.author.to_string(),
        "ad": comment.ad.to_string(),
        "created_at": comment.created_at.to_rfc3339(),
    })
}

/// Fixed-size page envelope. `next`/`previous` are page numbers, null at
/// either end of the range.
pub fn page_to_json<T>(
    page: &Page<T>,
    current: u32,
    to_json: impl Fn(&T) -> serde_json::Value,
) -> serde_json::Value {
    let last = last_page(page.total);
    json!({
        "count": page.total,
        "next": (current < last).then(|| current + 1),
        "previous": (current > 1).then(|| current - 1),
        "results": page.items.iter().map(to_json).collect::<Vec<_>>(),
    })
}

pub fn last_page(total: u64) -> u32 {
    total.div_ceil(u64::from(PAGE_SIZE)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use adboard_core::UserId;
    use adboard_listings::NewAd;

    fn ad(title: &str) -> Ad {
        Ad::create(
            UserId::new(),
            NewAd {
                title: title.to_string(),
                price: 100,
                description: "desc".to_string(),
                image_url: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn page_envelope_links_neighbouring_pages() {
        let page = Page {
            items: vec![ad("a"), ad("b")],
            total: 10,
        };
        let value = page_to_json(&page, 2, ad_to_json);
        assert_eq!(value["count"], 10);
        assert_eq!(value["next"], 3);
        assert_eq!(value["previous"], 1);
        assert_eq!(value["results"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn page_envelope_ends_are_null() {
        let page = Page {
            items: vec![ad("a")],
            total: 1,
        };
        let value = page_to_json(&page, 1, ad_to_json);
        assert!(value["next"].is_null());
        assert!(value["previous"].is_null());
    }

    #[test]
    fn last_page_rounds_up() {
        assert_eq!(last_page(0), 0);
        assert_eq!(last_page(4), 1);
        assert_eq!(last_page(5), 2);
    }

    #[test]
    fn password_hash_never_serializes() {
        let user = adboard_identity::User::register(
            adboard_identity::NewUser {
                email: "a@example.com".to_string(),
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                phone: "+15550000000".to_string(),
            },
            "secret-hash".to_string(),
        )
        .unwrap();
        let value = user_to_json(&user);
        assert!(!value.to_string().contains("secret-hash"));
    }
}
