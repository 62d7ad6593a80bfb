//! Helpers shared across route handlers.

use axum::http::StatusCode;
use axum::response::Response;

use adboard_infra::PageRequest;

use crate::app::errors::json_error;

/// Parse the `page` query parameter. Absent means the first page; anything
/// that is not a positive integer reads as an unknown page.
pub fn parse_page(raw: Option<&str>) -> Result<u32, Response> {
    let Some(raw) = raw else { return Ok(1) };
    match raw.parse::<u32>() {
        Ok(page) if page >= 1 => Ok(page),
        _ => Err(invalid_page()),
    }
}

/// Pages past the end of the result set are misses. The first page is the
/// exception: it renders empty so an empty collection is still browsable.
pub fn ensure_page_in_range(page: u32, total: u64) -> Result<(), Response> {
    if page > 1 && PageRequest::new(page).offset() >= total {
        return Err(invalid_page());
    }
    Ok(())
}

fn invalid_page() -> Response {
    json_error(StatusCode::NOT_FOUND, "not_found", "invalid page")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_page_defaults_to_first() {
        assert_eq!(parse_page(None).unwrap(), 1);
        assert_eq!(parse_page(Some("3")).unwrap(), 3);
    }

    #[test]
    fn malformed_pages_are_rejected() {
        assert!(parse_page(Some("0")).is_err());
        assert!(parse_page(Some("-1")).is_err());
        assert!(parse_page(Some("two")).is_err());
    }

    #[test]
    fn only_the_first_page_may_be_empty() {
        assert!(ensure_page_in_range(1, 0).is_ok());
        assert!(ensure_page_in_range(2, 4).is_err());
        assert!(ensure_page_in_range(2, 5).is_ok());
        assert!(ensure_page_in_range(3, 8).is_err());
    }
}
