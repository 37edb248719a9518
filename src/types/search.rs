//! Search parameters and the query strings built from them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// Result ordering supported by the search endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Most recently posted first
    #[default]
    Newest,
    /// Oldest first
    Oldest,
    /// Cheapest first
    PriceAsc,
    /// Most expensive first
    PriceDesc,
}

impl SortOrder {
    /// Every accepted value, default first.
    pub const ALL: [SortOrder; 4] = [
        SortOrder::Newest,
        SortOrder::Oldest,
        SortOrder::PriceAsc,
        SortOrder::PriceDesc,
    ];

    /// The wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::PriceAsc => "price_asc",
            SortOrder::PriceDesc => "price_desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|order| order.as_str() == s)
            .ok_or_else(|| {
                let options: Vec<&str> = Self::ALL.iter().map(SortOrder::as_str).collect();
                ValidationError::new(format!("Sort must be one of: {}", options.join(", ")))
            })
    }
}

/// What the caller is looking for.
///
/// Values are raw; [`KleinanzeigenClient::search_listings`](crate::rest::KleinanzeigenClient::search_listings)
/// validates them before building a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    /// Free-text search term
    pub query: Option<String>,
    /// Free-text location (city or postal code)
    pub location: Option<String>,
    /// Location id from a location search; wins over `location`
    pub location_id: Option<i64>,
    /// Search radius in km
    pub radius: Option<i64>,
    /// Minimum price in euros
    pub min_price: Option<i64>,
    /// Maximum price in euros
    pub max_price: Option<i64>,
    /// Sort key; `newest` when absent
    pub sort: Option<String>,
    /// Comma-separated category ids
    pub category: Option<String>,
    /// Number of result pages (1-20); 1 when absent
    pub page_count: Option<i64>,
}

impl SearchParams {
    /// Create empty parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search term.
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Set a free-text location.
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set a location id.
    pub fn location_id(mut self, location_id: i64) -> Self {
        self.location_id = Some(location_id);
        self
    }

    /// Set the search radius in km.
    pub fn radius(mut self, radius: i64) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Set the price range in euros.
    pub fn price_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    /// Set the sort key.
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Set the category filter.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the number of result pages.
    pub fn page_count(mut self, page_count: i64) -> Self {
        self.page_count = Some(page_count);
        self
    }

    /// Build parameters from loosely typed tool arguments.
    ///
    /// Numeric fields must be JSON integers; a numeric-looking string such
    /// as `"100"` is rejected. `null` counts as absent.
    pub fn from_arguments(args: &Value) -> Result<Self, ValidationError> {
        let args = match args {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::default()),
            _ => return Err(ValidationError::new("Arguments must be an object")),
        };

        let string_arg = |name: &str| -> Result<Option<String>, ValidationError> {
            match args.get(name) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::String(s)) => Ok(Some(s.clone())),
                Some(_) => Err(ValidationError::new(format!("{name} must be a string"))),
            }
        };
        let integer_arg = |name: &str| -> Result<Option<i64>, ValidationError> {
            match args.get(name) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::Number(n)) => n
                    .as_i64()
                    .map(Some)
                    .ok_or_else(|| ValidationError::new(format!("{name} must be an integer"))),
                Some(_) => Err(ValidationError::new(format!("{name} must be an integer"))),
            }
        };

        Ok(Self {
            query: string_arg("query")?,
            location: string_arg("location")?,
            location_id: integer_arg("location_id")?,
            radius: integer_arg("radius")?,
            min_price: integer_arg("min_price")?,
            max_price: integer_arg("max_price")?,
            sort: string_arg("sort")?,
            category: string_arg("category")?,
            page_count: integer_arg("page_count")?,
        })
    }
}

/// Query string of the search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<i64>,
    pub sort: SortOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Query string of the location search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationsRequest {
    pub query: String,
    pub limit: u32,
}

/// Query string of the listing detail endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingDetailRequest {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!("newest".parse::<SortOrder>().unwrap(), SortOrder::Newest);
        assert_eq!("price_desc".parse::<SortOrder>().unwrap(), SortOrder::PriceDesc);

        let err = "random".parse::<SortOrder>().unwrap_err();
        assert_eq!(
            err.message(),
            "Sort must be one of: newest, oldest, price_asc, price_desc"
        );
    }

    #[test]
    fn test_from_arguments() {
        let params = SearchParams::from_arguments(&json!({
            "query": "fahrrad",
            "location_id": 1234,
            "min_price": 10,
            "max_price": null,
            "page_count": 2
        }))
        .unwrap();

        assert_eq!(params.query.as_deref(), Some("fahrrad"));
        assert_eq!(params.location_id, Some(1234));
        assert_eq!(params.min_price, Some(10));
        assert_eq!(params.max_price, None);
        assert_eq!(params.page_count, Some(2));
    }

    #[test]
    fn test_from_arguments_rejects_numeric_strings() {
        let err = SearchParams::from_arguments(&json!({ "min_price": "100" })).unwrap_err();
        assert_eq!(err.message(), "min_price must be an integer");

        let err = SearchParams::from_arguments(&json!({ "radius": 2.5 })).unwrap_err();
        assert_eq!(err.message(), "radius must be an integer");
    }

    #[test]
    fn test_search_request_query_string() {
        let request = SearchRequest {
            query: Some("rotes fahrrad".to_string()),
            limit: 10,
            location_id: Some(42),
            sort: SortOrder::PriceAsc,
            ..SearchRequest::default()
        };

        let encoded = serde_urlencoded::to_string(&request).unwrap();
        assert_eq!(encoded, "query=rotes+fahrrad&limit=10&location_id=42&sort=price_asc");
    }
}
