use chrono::{DateTime, Utc};

use adboard_auth::Owned;
use adboard_core::{AdId, DomainError, DomainResult, Entity, UserId};

pub const MAX_TITLE_LEN: usize = 200;
/// Prices are 32-bit positive integers; this also keeps them storable in a
/// signed 64-bit database column.
pub const MAX_PRICE: u64 = i32::MAX as u64;

/// A classified ad. The author is fixed at creation and never reassigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ad {
    pub id: AdId,
    pub title: String,
    /// Price in whole currency units. Unsigned by construction; zero is
    /// rejected at validation.
    pub price: u64,
    pub description: String,
    pub author: UserId,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Client-suppliable creation fields. The author never travels here; the
/// surface stamps it from the verified caller.
#[derive(Debug, Clone)]
pub struct NewAd {
    pub title: String,
    pub price: u64,
    pub description: String,
    pub image_url: Option<String>,
}

/// Partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct AdPatch {
    pub title: Option<String>,
    pub price: Option<u64>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Listing query filter: free-text search over title/description plus
/// inclusive price bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdFilter {
    pub search: Option<String>,
    pub price_min: Option<u64>,
    pub price_max: Option<u64>,
}

impl Ad {
    /// Create a new ad owned by `author`. Validates every field.
    pub fn create(author: UserId, input: NewAd) -> DomainResult<Self> {
        Ok(Self {
            id: AdId::new(),
            title: validate_title(&input.title)?,
            price: validate_price(input.price)?,
            description: validate_description(&input.description)?,
            author,
            image_url: input.image_url,
            created_at: Utc::now(),
        })
    }

    /// Apply a patch, validating each supplied field. Fails atomically: on
    /// the first invalid field nothing is mutated.
    pub fn apply_patch(&mut self, patch: AdPatch) -> DomainResult<()> {
        let title = patch.title.as_deref().map(validate_title).transpose()?;
        let price = patch.price.map(validate_price).transpose()?;
        let description = patch
            .description
            .as_deref()
            .map(validate_description)
            .transpose()?;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(price) = price {
            self.price = price;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = Some(image_url);
        }
        Ok(())
    }
}

impl Entity for Ad {
    type Id = AdId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Owned for Ad {
    fn owner(&self) -> UserId {
        self.author
    }
}

impl AdFilter {
    /// Whether `ad` satisfies the filter. Search is a case-insensitive
    /// substring match against title or description; price bounds are
    /// inclusive.
    pub fn matches(&self, ad: &Ad) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !needle.is_empty()
                && !ad.title.to_lowercase().contains(&needle)
                && !ad.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(min) = self.price_min {
            if ad.price < min {
                return false;
            }
        }
        if let Some(max) = self.price_max {
            if ad.price > max {
                return false;
            }
        }
        true
    }
}

fn validate_title(raw: &str) -> DomainResult<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(DomainError::validation("title cannot be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::validation(format!(
            "title cannot exceed {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

fn validate_price(price: u64) -> DomainResult<u64> {
    if price == 0 {
        return Err(DomainError::validation("price must be positive"));
    }
    if price > MAX_PRICE {
        return Err(DomainError::validation(format!(
            "price cannot exceed {MAX_PRICE}"
        )));
    }
    Ok(price)
}

fn validate_description(raw: &str) -> DomainResult<String> {
    let description = raw.trim();
    if description.is_empty() {
        return Err(DomainError::validation("description cannot be empty"));
    }
    Ok(description.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> UserId {
        UserId::new()
    }

    fn new_ad() -> NewAd {
        NewAd {
            title: "Mountain bike".to_string(),
            price: 100,
            description: "Hardly used, some scratches".to_string(),
            image_url: None,
        }
    }

    #[test]
    fn create_trims_and_keeps_fields() {
        let mut input = new_ad();
        input.title = "  Mountain bike  ".to_string();
        let ad = Ad::create(author(), input).unwrap();
        assert_eq!(ad.title, "Mountain bike");
        assert_eq!(ad.price, 100);
    }

    #[test]
    fn create_rejects_empty_title() {
        let mut input = new_ad();
        input.title = "   ".to_string();
        assert!(matches!(
            Ad::create(author(), input).unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[test]
    fn create_rejects_overlong_title() {
        let mut input = new_ad();
        input.title = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(Ad::create(author(), input).is_err());

        let mut input = new_ad();
        input.title = "x".repeat(MAX_TITLE_LEN);
        assert!(Ad::create(author(), input).is_ok());
    }

    #[test]
    fn create_rejects_zero_price() {
        let mut input = new_ad();
        input.price = 0;
        assert!(matches!(
            Ad::create(author(), input).unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[test]
    fn create_rejects_price_above_cap() {
        let mut input = new_ad();
        input.price = MAX_PRICE + 1;
        assert!(Ad::create(author(), input).is_err());

        let mut input = new_ad();
        input.price = MAX_PRICE;
        assert!(Ad::create(author(), input).is_ok());
    }

    #[test]
    fn create_rejects_blank_description() {
        let mut input = new_ad();
        input.description = String::new();
        assert!(Ad::create(author(), input).is_err());
    }

    #[test]
    fn owner_is_the_author() {
        let who = author();
        let ad = Ad::create(who, new_ad()).unwrap();
        assert_eq!(ad.owner(), who);
    }

    #[test]
    fn patch_updates_supplied_fields_only() {
        let mut ad = Ad::create(author(), new_ad()).unwrap();
        ad.apply_patch(AdPatch {
            price: Some(250),
            ..AdPatch::default()
        })
        .unwrap();
        assert_eq!(ad.price, 250);
        assert_eq!(ad.title, "Mountain bike");
    }

    #[test]
    fn invalid_patch_leaves_ad_untouched() {
        let mut ad = Ad::create(author(), new_ad()).unwrap();
        let err = ad
            .apply_patch(AdPatch {
                title: Some("New title".to_string()),
                price: Some(0),
                ..AdPatch::default()
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(ad.title, "Mountain bike");
        assert_eq!(ad.price, 100);
    }

    #[test]
    fn filter_search_is_case_insensitive_over_title_and_description() {
        let ad = Ad::create(author(), new_ad()).unwrap();

        let by_title = AdFilter {
            search: Some("MOUNTAIN".to_string()),
            ..AdFilter::default()
        };
        assert!(by_title.matches(&ad));

        let by_description = AdFilter {
            search: Some("scratches".to_string()),
            ..AdFilter::default()
        };
        assert!(by_description.matches(&ad));

        let miss = AdFilter {
            search: Some("boat".to_string()),
            ..AdFilter::default()
        };
        assert!(!miss.matches(&ad));
    }

    #[test]
    fn filter_price_bounds_are_inclusive() {
        let ad = Ad::create(author(), new_ad()).unwrap();

        let exact = AdFilter {
            price_min: Some(100),
            price_max: Some(100),
            ..AdFilter::default()
        };
        assert!(exact.matches(&ad));

        let below = AdFilter {
            price_min: Some(101),
            ..AdFilter::default()
        };
        assert!(!below.matches(&ad));

        let above = AdFilter {
            price_max: Some(99),
            ..AdFilter::default()
        };
        assert!(!above.matches(&ad));
    }

    #[test]
    fn empty_filter_matches_everything() {
        let ad = Ad::create(author(), new_ad()).unwrap();
        assert!(AdFilter::default().matches(&ad));
    }
}
