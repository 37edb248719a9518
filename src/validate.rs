//! Input validation for search and lookup parameters.
//!
//! Every validator is a pure function: it either returns the sanitized value
//! or a [`ValidationError`] describing the violated constraint. Absent
//! optional input passes through as `None`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;
use crate::types::SortOrder;

/// Maximum length of a search query after whitespace collapsing.
pub const MAX_QUERY_LENGTH: usize = 500;
/// Maximum length of a free-text location.
pub const MAX_LOCATION_LENGTH: usize = 100;
/// Lowest accepted price in euros.
pub const MIN_PRICE: i64 = 0;
/// Highest accepted price in euros.
pub const MAX_PRICE: i64 = 999_999_999;
/// Smallest search radius in km.
pub const MIN_RADIUS: i64 = 1;
/// Largest search radius in km.
pub const MAX_RADIUS: i64 = 200;
/// Fewest result pages.
pub const MIN_PAGE_COUNT: i64 = 1;
/// Most result pages.
pub const MAX_PAGE_COUNT: i64 = 20;
/// Location search result limit when none is given.
pub const DEFAULT_LOCATION_LIMIT: u32 = 20;
/// Largest location search result limit.
pub const MAX_LOCATION_LIMIT: i64 = 100;

static MARKUP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<script|javascript:|on\w+=").expect("valid regex"));
static LOCATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\s,äöüßÄÖÜ\-]+$").expect("valid regex"));
static DIGITS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("valid regex"));

/// Collapse whitespace in a search query and reject script-like content.
///
/// A query that is empty after collapsing counts as absent.
///
/// This is a narrow denylist (script tags, `javascript:` and inline event
/// handlers), not an HTML sanitizer.
pub fn validate_query(query: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(query) = query.filter(|q| !q.is_empty()) else {
        return Ok(None);
    };

    let query = query.split_whitespace().collect::<Vec<_>>().join(" ");
    if query.is_empty() {
        return Ok(None);
    }

    if query.chars().count() > MAX_QUERY_LENGTH {
        return Err(ValidationError::new(format!(
            "Query too long (max {MAX_QUERY_LENGTH} characters)"
        )));
    }

    if MARKUP_PATTERN.is_match(&query) {
        return Err(ValidationError::new("Invalid characters in query"));
    }

    Ok(Some(query))
}

/// Trim a free-text location and restrict it to letters, digits, whitespace,
/// commas, hyphens and German umlauts.
pub fn validate_location(location: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(location) = location.filter(|l| !l.is_empty()) else {
        return Ok(None);
    };

    let location = location.trim();

    if location.chars().count() > MAX_LOCATION_LENGTH {
        return Err(ValidationError::new(format!(
            "Location too long (max {MAX_LOCATION_LENGTH} characters)"
        )));
    }

    if !LOCATION_PATTERN.is_match(location) {
        return Err(ValidationError::new("Invalid location format"));
    }

    Ok(Some(location.to_string()))
}

/// Check a price bound in euros. `field_name` names the bound in messages.
pub fn validate_price(price: Option<i64>, field_name: &str) -> Result<Option<i64>, ValidationError> {
    match price {
        Some(p) if !(MIN_PRICE..=MAX_PRICE).contains(&p) => Err(ValidationError::new(format!(
            "{field_name} must be between {MIN_PRICE} and {MAX_PRICE}"
        ))),
        other => Ok(other),
    }
}

/// Check a search radius in km.
pub fn validate_radius(radius: Option<i64>) -> Result<Option<i64>, ValidationError> {
    match radius {
        Some(r) if !(MIN_RADIUS..=MAX_RADIUS).contains(&r) => Err(ValidationError::new(format!(
            "Radius must be between {MIN_RADIUS} and {MAX_RADIUS} km"
        ))),
        other => Ok(other),
    }
}

/// Check the requested page count. Absent means one page.
pub fn validate_page_count(page_count: Option<i64>) -> Result<u32, ValidationError> {
    let page_count = page_count.unwrap_or(MIN_PAGE_COUNT);
    if !(MIN_PAGE_COUNT..=MAX_PAGE_COUNT).contains(&page_count) {
        return Err(ValidationError::new(format!(
            "Page count must be between {MIN_PAGE_COUNT} and {MAX_PAGE_COUNT}"
        )));
    }
    Ok(page_count as u32)
}

/// Parse a sort key. Absent or empty means [`SortOrder::Newest`].
pub fn validate_sort(sort: Option<&str>) -> Result<SortOrder, ValidationError> {
    match sort {
        None | Some("") => Ok(SortOrder::default()),
        Some(sort) => sort.parse(),
    }
}

/// Trim a listing id and require it to be all digits.
pub fn validate_listing_id(listing_id: Option<&str>) -> Result<String, ValidationError> {
    let Some(listing_id) = listing_id.filter(|id| !id.is_empty()) else {
        return Err(ValidationError::new("Listing ID is required"));
    };

    let listing_id = listing_id.trim();
    if !DIGITS_PATTERN.is_match(listing_id) {
        return Err(ValidationError::new("Invalid listing ID format"));
    }

    Ok(listing_id.to_string())
}

/// Normalize a comma-separated list of numeric category ids.
pub fn validate_category(category: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(category) = category.filter(|c| !c.is_empty()) else {
        return Ok(None);
    };

    let ids = category
        .split(',')
        .map(|segment| {
            let id = segment.trim();
            if DIGITS_PATTERN.is_match(id) {
                Ok(id)
            } else {
                Err(ValidationError::new(format!("Invalid category ID: {segment}")))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(ids.join(",")))
}

/// Sanitize a location search term, which unlike a listing query is required.
pub fn validate_location_query(query: Option<&str>) -> Result<String, ValidationError> {
    validate_query(query)?.ok_or_else(|| ValidationError::new("Location query is required"))
}

/// Check a location search result limit. Absent means 20.
pub fn validate_location_limit(limit: Option<i64>) -> Result<u32, ValidationError> {
    match limit {
        None => Ok(DEFAULT_LOCATION_LIMIT),
        Some(l) if (1..=MAX_LOCATION_LIMIT).contains(&l) => Ok(l as u32),
        Some(_) => Err(ValidationError::new(format!(
            "Limit must be between 1 and {MAX_LOCATION_LIMIT}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_collapses_whitespace() {
        assert_eq!(
            validate_query(Some("  multiple   spaces  ")).unwrap().as_deref(),
            Some("multiple spaces")
        );
        assert_eq!(validate_query(Some("iPhone\t12\nPro")).unwrap().as_deref(), Some("iPhone 12 Pro"));
        assert_eq!(validate_query(None).unwrap(), None);
        assert_eq!(validate_query(Some("")).unwrap(), None);
        assert_eq!(validate_query(Some(" \t\n ")).unwrap(), None);
    }

    #[test]
    fn test_query_rejects_markup() {
        for query in [
            "<script>x</script>",
            "<SCRIPT>alert(1)</SCRIPT>",
            "JavaScript:alert(1)",
            "img onerror=alert(1)",
        ] {
            let err = validate_query(Some(query)).unwrap_err();
            assert_eq!(err.message(), "Invalid characters in query", "{query}");
        }
        assert!(validate_query(Some("sofa <3 online")).is_ok());
    }

    #[test]
    fn test_query_length_limit() {
        let long = "a".repeat(MAX_QUERY_LENGTH + 1);
        assert!(validate_query(Some(&long)).is_err());
        let max = "a".repeat(MAX_QUERY_LENGTH);
        assert!(validate_query(Some(&max)).is_ok());
    }

    #[test]
    fn test_location() {
        assert_eq!(
            validate_location(Some("  München, Bayern ")).unwrap().as_deref(),
            Some("München, Bayern")
        );
        assert_eq!(
            validate_location(Some("Frankfurt-Höchst")).unwrap().as_deref(),
            Some("Frankfurt-Höchst")
        );
        assert_eq!(validate_location(Some("10178")).unwrap().as_deref(), Some("10178"));
        assert!(validate_location(Some("Berlin; DROP TABLE")).is_err());
        assert!(validate_location(Some(&"x".repeat(MAX_LOCATION_LENGTH + 1))).is_err());
        assert_eq!(validate_location(None).unwrap(), None);
    }

    #[test]
    fn test_price_bounds() {
        assert_eq!(validate_price(Some(0), "min_price").unwrap(), Some(0));
        assert_eq!(validate_price(Some(MAX_PRICE), "max_price").unwrap(), Some(MAX_PRICE));
        assert_eq!(validate_price(None, "min_price").unwrap(), None);

        let err = validate_price(Some(-1), "min_price").unwrap_err();
        assert_eq!(err.message(), "min_price must be between 0 and 999999999");
        assert!(validate_price(Some(1_000_000_000), "max_price").is_err());
    }

    #[test]
    fn test_radius_bounds() {
        assert_eq!(validate_radius(Some(1)).unwrap(), Some(1));
        assert_eq!(validate_radius(Some(200)).unwrap(), Some(200));
        assert!(validate_radius(Some(0)).is_err());
        assert!(validate_radius(Some(201)).is_err());
    }

    #[test]
    fn test_page_count() {
        assert_eq!(validate_page_count(None).unwrap(), 1);
        assert_eq!(validate_page_count(Some(20)).unwrap(), 20);
        assert!(validate_page_count(Some(0)).is_err());
        assert!(validate_page_count(Some(21)).is_err());
    }

    #[test]
    fn test_sort() {
        assert_eq!(validate_sort(None).unwrap(), SortOrder::Newest);
        assert_eq!(validate_sort(Some("")).unwrap(), SortOrder::Newest);
        assert_eq!(validate_sort(Some("price_asc")).unwrap(), SortOrder::PriceAsc);
        assert!(validate_sort(Some("random")).is_err());
        assert!(validate_sort(Some("NEWEST")).is_err());
    }

    #[test]
    fn test_listing_id() {
        assert_eq!(validate_listing_id(Some(" 42 ")).unwrap(), "42");

        let missing = validate_listing_id(None).unwrap_err();
        assert_eq!(missing.message(), "Listing ID is required");
        let empty = validate_listing_id(Some("")).unwrap_err();
        assert_eq!(empty.message(), "Listing ID is required");

        let bad = validate_listing_id(Some("12a")).unwrap_err();
        assert_eq!(bad.message(), "Invalid listing ID format");
        assert!(validate_listing_id(Some("   ")).is_err());
    }

    #[test]
    fn test_category() {
        assert_eq!(validate_category(Some(" 1 , 2 ")).unwrap().as_deref(), Some("1,2"));
        assert_eq!(validate_category(Some("161")).unwrap().as_deref(), Some("161"));
        assert_eq!(validate_category(None).unwrap(), None);

        let err = validate_category(Some("1,abc")).unwrap_err();
        assert_eq!(err.message(), "Invalid category ID: abc");
        assert!(validate_category(Some("1,,2")).is_err());
    }

    #[test]
    fn test_location_search_inputs() {
        assert_eq!(validate_location_query(Some(" Berlin ")).unwrap(), "Berlin");
        assert!(validate_location_query(None).is_err());
        let err = validate_location_query(Some("   ")).unwrap_err();
        assert_eq!(err.message(), "Location query is required");
        assert_eq!(validate_location_limit(None).unwrap(), DEFAULT_LOCATION_LIMIT);
        assert_eq!(validate_location_limit(Some(100)).unwrap(), 100);
        assert!(validate_location_limit(Some(0)).is_err());
    }
}
