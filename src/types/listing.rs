//! Normalized listing, location and category records.

use serde::{Deserialize, Serialize};

/// An image attached to a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingImage {
    /// Image URL
    pub url: String,
    /// Alternative text, when the API provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

impl ListingImage {
    /// Create an image record from its URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt_text: None,
        }
    }
}

/// A classified ad in display-ready form.
///
/// Text fields the API did not provide are empty strings rather than absent,
/// so rendering never has to branch on missing data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Ad id (`adid` upstream)
    pub id: String,
    /// Title
    pub title: String,
    /// Display price, e.g. `€ 100` or `Auf Anfrage`
    pub price: String,
    /// `City, State`
    pub location: String,
    /// Upload date as sent by the API
    pub date: String,
    /// Public listing page
    pub url: String,
    /// Description
    pub description: String,
    /// Images in upstream order
    pub images: Vec<ListingImage>,
    /// Seller display name
    pub seller: String,
    /// `Versand möglich`, `Nur Abholung` or empty
    pub shipping: String,
}

/// A place that can be used to scope a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Location id, usable as `location_id` in a search
    pub id: String,
    /// City
    pub city: String,
    /// Federal state
    pub state: String,
    /// Postal code
    pub zip: String,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

/// A listing category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category id, usable in a search `category` filter
    pub id: i64,
    /// Display name
    pub name: String,
}
