//! Listing, location, category and documentation operations.

use serde_json::Value;

use crate::error::{KleinanzeigenError, ValidationError};
use crate::normalize::{parse_categories, parse_listing, parse_listings, parse_locations};
use crate::rest::KleinanzeigenClient;
use crate::rest::endpoints::{self, API_MAX_LIMIT};
use crate::types::{
    Category, Envelope, Listing, ListingDetailRequest, Location, LocationsRequest, SearchParams,
    SearchRequest,
};
use crate::validate;

/// Result limit sent for a search of `page_count` pages.
///
/// With a page count this is
/// `min(API_MAX_LIMIT, page_count * API_MAX_LIMIT, max_pages * API_MAX_LIMIT)`:
/// the page count scales the per-page ceiling rather than selecting a page,
/// and only one request is ever made, so the result never exceeds one page.
/// Without one the configured results per page apply, capped at `API_MAX_LIMIT`.
pub fn result_limit(page_count: Option<u32>, max_pages: u32, max_results_per_page: u32) -> u32 {
    match page_count {
        Some(page_count) => API_MAX_LIMIT
            .min(page_count.saturating_mul(API_MAX_LIMIT))
            .min(max_pages.saturating_mul(API_MAX_LIMIT)),
        None => API_MAX_LIMIT.min(max_results_per_page),
    }
}

impl KleinanzeigenClient {
    /// Search listings.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use kleinanzeigen_api_client::rest::KleinanzeigenClient;
    /// use kleinanzeigen_api_client::types::SearchParams;
    ///
    /// # async fn run(client: KleinanzeigenClient) {
    /// let params = SearchParams::new()
    ///     .query("iPhone 12")
    ///     .location("Hamburg")
    ///     .radius(20)
    ///     .price_range(Some(100), Some(400))
    ///     .sort("price_asc");
    ///
    /// let result = client.search_listings(&params).await;
    /// match result.into_result() {
    ///     Ok(listings) => println!("Found {} listings", listings.len()),
    ///     Err(e) => eprintln!("Search failed: {e}"),
    /// }
    /// # }
    /// ```
    pub async fn search_listings(&self, params: &SearchParams) -> Envelope<Vec<Listing>> {
        self.try_search_listings(params).await.into()
    }

    /// Get a single listing by id.
    pub async fn get_listing_details(&self, listing_id: &str) -> Envelope<Listing> {
        self.try_get_listing_details(listing_id).await.into()
    }

    /// Search locations by city, postal code or state.
    ///
    /// `limit` defaults to 20 and may not exceed 100.
    pub async fn search_locations(&self, query: &str, limit: Option<i64>) -> Envelope<Vec<Location>> {
        self.try_search_locations(query, limit).await.into()
    }

    /// Get all listing categories.
    ///
    /// An empty category list is reported as a failure.
    pub async fn get_categories(&self) -> Envelope<Vec<Category>> {
        self.try_get_categories().await.into()
    }

    /// Get the API documentation page.
    pub async fn get_docs(&self) -> Envelope<String> {
        self.try_get_docs().await.into()
    }

    /// Validate search parameters and build the upstream query.
    ///
    /// A location id takes precedence over a free-text location.
    pub fn build_search_request(&self, params: &SearchParams) -> Result<SearchRequest, ValidationError> {
        let page_count = match params.page_count {
            Some(page_count) => Some(validate::validate_page_count(Some(page_count))?),
            None => None,
        };
        let location = match params.location_id {
            Some(_) => None,
            None => validate::validate_location(params.location.as_deref())?,
        };

        Ok(SearchRequest {
            query: validate::validate_query(params.query.as_deref())?,
            limit: result_limit(page_count, self.max_pages(), self.max_results_per_page()),
            location_id: params.location_id,
            location,
            min_price: validate::validate_price(params.min_price, "min_price")?,
            max_price: validate::validate_price(params.max_price, "max_price")?,
            radius: validate::validate_radius(params.radius)?,
            sort: validate::validate_sort(params.sort.as_deref())?,
            category: validate::validate_category(params.category.as_deref())?,
        })
    }

    async fn try_search_listings(&self, params: &SearchParams) -> Result<Vec<Listing>, KleinanzeigenError> {
        let request = self.build_search_request(params)?;
        let payload = self.get_json_with_params(endpoints::SEARCH, &request).await?;

        let items = list_field(data_field(&payload)?, "ads")?;
        let listings = parse_listings(items);
        tracing::debug!("Search returned {} of {} listings", listings.len(), items.len());
        Ok(listings)
    }

    async fn try_get_listing_details(&self, listing_id: &str) -> Result<Listing, KleinanzeigenError> {
        let id = validate::validate_listing_id(Some(listing_id))?;
        let request = ListingDetailRequest { id };
        let payload = self.get_json_with_params(endpoints::LISTING, &request).await?;

        let item = data_field(&payload)?;
        parse_listing(item, Some(&request.id)).map_err(|e| {
            KleinanzeigenError::InvalidResponse(format!("Listing {} could not be read: {}", request.id, e))
        })
    }

    async fn try_search_locations(
        &self,
        query: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Location>, KleinanzeigenError> {
        let request = LocationsRequest {
            query: validate::validate_location_query(Some(query))?,
            limit: validate::validate_location_limit(limit)?,
        };
        let payload = self.get_json_with_params(endpoints::LOCATIONS, &request).await?;

        let items = list_field(data_field(&payload)?, "locations")?;
        Ok(parse_locations(items))
    }

    async fn try_get_categories(&self) -> Result<Vec<Category>, KleinanzeigenError> {
        let payload = self.get_json(endpoints::CATEGORIES).await?;

        let items = match payload.get("categories") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => list_field(data_field(&payload)?, "categories")?,
        };
        if items.is_empty() {
            return Err(KleinanzeigenError::InvalidResponse(
                "Categories not found".to_string(),
            ));
        }
        Ok(parse_categories(items))
    }

    async fn try_get_docs(&self) -> Result<String, KleinanzeigenError> {
        let docs = self.get_text(endpoints::DOCS).await?;
        if docs.trim().is_empty() {
            return Err(KleinanzeigenError::InvalidResponse(
                "Documentation not available".to_string(),
            ));
        }
        Ok(docs)
    }
}

/// The payload's `data` member, which must be present and not `null`.
fn data_field(payload: &Value) -> Result<&Value, KleinanzeigenError> {
    match payload.get("data") {
        Some(Value::Null) | None => Err(KleinanzeigenError::InvalidResponse(
            "Response missing 'data' field".to_string(),
        )),
        Some(data) => Ok(data),
    }
}

/// Items of `data`: either `data` itself or its `key` member. A missing or
/// `null` member means no items.
fn list_field<'a>(data: &'a Value, key: &str) -> Result<&'a [Value], KleinanzeigenError> {
    match data {
        Value::Array(items) => Ok(items),
        Value::Object(map) => match map.get(key) {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) | None => Ok(&[]),
            Some(_) => Err(KleinanzeigenError::InvalidResponse(format!(
                "'{key}' is not a list"
            ))),
        },
        _ => Err(KleinanzeigenError::InvalidResponse(
            "'data' is neither a list nor an object".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SortOrder;
    use serde_json::json;

    #[test]
    fn test_result_limit() {
        assert_eq!(result_limit(Some(1), 20, 50), 10);
        assert_eq!(result_limit(Some(2), 20, 50), 10);
        assert_eq!(result_limit(Some(20), 1, 50), 10);
        assert_eq!(result_limit(Some(u32::MAX), u32::MAX, 50), 10);
        assert_eq!(result_limit(Some(1), 20, 5), 10);
    }

    #[test]
    fn test_result_limit_without_page_count() {
        assert_eq!(result_limit(None, 20, 50), 10);
        assert_eq!(result_limit(None, 20, 5), 5);
    }

    #[test]
    fn test_build_search_request_uses_results_per_page() {
        let client = KleinanzeigenClient::builder().max_results_per_page(4).build();

        let request = client.build_search_request(&SearchParams::new()).unwrap();
        assert_eq!(request.limit, 4);

        let request = client
            .build_search_request(&SearchParams::new().page_count(1))
            .unwrap();
        assert_eq!(request.limit, 10);
    }

    #[test]
    fn test_build_search_request_drops_blank_query() {
        let client = KleinanzeigenClient::new();
        let request = client
            .build_search_request(&SearchParams::new().query("   "))
            .unwrap();
        assert_eq!(request.query, None);
        assert!(!serde_urlencoded::to_string(&request).unwrap().contains("query="));
    }

    #[test]
    fn test_build_search_request() {
        let client = KleinanzeigenClient::builder().max_pages(20).build();
        let params = SearchParams::new()
            .query("  rotes   fahrrad ")
            .location("Berlin")
            .location_id(42)
            .price_range(Some(0), Some(500))
            .category(" 1 , 2 ")
            .page_count(2);

        let request = client.build_search_request(&params).unwrap();
        assert_eq!(request.query.as_deref(), Some("rotes fahrrad"));
        assert_eq!(request.limit, 10);
        assert_eq!(request.location_id, Some(42));
        assert_eq!(request.location, None);
        assert_eq!(request.min_price, Some(0));
        assert_eq!(request.sort, SortOrder::Newest);
        assert_eq!(request.category.as_deref(), Some("1,2"));
    }

    #[test]
    fn test_build_search_request_rejects_invalid_input() {
        let client = KleinanzeigenClient::new();

        let err = client
            .build_search_request(&SearchParams::new().sort("random"))
            .unwrap_err();
        assert!(err.message().starts_with("Sort must be one of"));

        assert!(client.build_search_request(&SearchParams::new().page_count(21)).is_err());
        assert!(client.build_search_request(&SearchParams::new().radius(500)).is_err());
    }

    #[test]
    fn test_list_field_shapes() {
        let nested = json!({ "ads": [{ "adid": "1" }] });
        assert_eq!(list_field(&nested, "ads").unwrap().len(), 1);

        let bare = json!([{ "adid": "1" }, { "adid": "2" }]);
        assert_eq!(list_field(&bare, "ads").unwrap().len(), 2);

        assert!(list_field(&json!({}), "ads").unwrap().is_empty());
        assert!(list_field(&json!({ "ads": "nope" }), "ads").is_err());
        assert!(list_field(&json!("text"), "ads").is_err());
    }

    #[test]
    fn test_data_field_required() {
        assert!(data_field(&json!({ "success": true })).is_err());
        assert!(data_field(&json!({ "success": true, "data": null })).is_err());
    }
}
