//! Mapping of raw API payloads into [`Listing`], [`Location`] and [`Category`].
//!
//! Upstream records are loosely typed: prices arrive as numbers or strings,
//! ids as strings or numbers, and most fields may be missing or `null`. Each
//! field mapper here is total and falls back to an empty value. Only a record
//! that cannot be mapped at all (not an object, a non-string image URL,
//! unusable coordinates) fails, and the batch mappers skip such records
//! with a warning instead of failing the whole batch.

use serde_json::Value;
use thiserror::Error;

use crate::types::{Category, Listing, ListingImage, Location};

/// Display price for listings offered at price zero.
pub const PRICE_ON_REQUEST: &str = "Auf Anfrage";
/// Display shipping text for `shipping: true`.
pub const SHIPPING_AVAILABLE: &str = "Versand möglich";
/// Display shipping text for `shipping: false`.
pub const PICKUP_ONLY: &str = "Nur Abholung";
/// Display shipping text when the API sent no shipping flag.
#[cfg(feature = "shipping-unknown-label")]
pub const SHIPPING_UNKNOWN: &str = "Keine Angabe";
/// Prefix of public listing pages.
pub const LISTING_URL_PREFIX: &str = "https://www.kleinanzeigen.de/s-anzeige/";

/// Why a single record could not be mapped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ItemError {
    /// The record is not a JSON object
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// An image list entry is not a URL string
    #[error("image {index} is not a string")]
    InvalidImage {
        /// Position in the image list
        index: usize,
    },

    /// The image list is not an array
    #[error("images is not a list")]
    InvalidImages,

    /// A required field is missing or has the wrong type
    #[error("missing or invalid field '{0}'")]
    InvalidField(&'static str),
}

/// Map one raw ad into a [`Listing`].
///
/// `fallback_id` is used when the record carries no `adid`, e.g. for a detail
/// lookup where the caller already knows the id.
pub fn parse_listing(raw: &Value, fallback_id: Option<&str>) -> Result<Listing, ItemError> {
    let item = raw
        .as_object()
        .ok_or_else(|| ItemError::NotAnObject(json_type(raw)))?;

    let id = match item.get("adid").map(text).filter(|id| !id.is_empty()) {
        Some(id) => id,
        None => fallback_id.unwrap_or_default().to_string(),
    };

    Ok(Listing {
        url: listing_url(&id),
        title: item.get("title").map(text).unwrap_or_default(),
        price: format_price(item.get("price")),
        location: format_location(item.get("location")),
        date: item.get("upload_date").map(text).unwrap_or_default(),
        description: item.get("description").map(text).unwrap_or_default(),
        images: parse_images(item.get("images"))?,
        seller: format_seller(item.get("seller"), item.get("location")),
        shipping: format_shipping(item.get("shipping")),
        id,
    })
}

/// Map a batch of raw ads, skipping records that fail to map.
pub fn parse_listings(items: &[Value]) -> Vec<Listing> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match parse_listing(item, None) {
            Ok(listing) => Some(listing),
            Err(e) => {
                tracing::warn!("Skipping listing {}: {}", index, e);
                None
            }
        })
        .collect()
}

/// Map one raw location record.
///
/// Requires an id and coordinates convertible to floats; numeric strings
/// such as `"52.52"` are accepted.
pub fn parse_location_item(raw: &Value) -> Result<Location, ItemError> {
    let item = raw
        .as_object()
        .ok_or_else(|| ItemError::NotAnObject(json_type(raw)))?;

    let id = item
        .get("id")
        .map(text)
        .filter(|id| !id.is_empty())
        .ok_or(ItemError::InvalidField("id"))?;

    Ok(Location {
        id,
        city: item.get("city").map(text).unwrap_or_default(),
        state: item.get("state").map(text).unwrap_or_default(),
        zip: item.get("zip").map(text).unwrap_or_default(),
        latitude: coordinate(item.get("latitude")).ok_or(ItemError::InvalidField("latitude"))?,
        longitude: coordinate(item.get("longitude")).ok_or(ItemError::InvalidField("longitude"))?,
    })
}

/// Map a batch of raw location records, skipping malformed ones.
pub fn parse_locations(items: &[Value]) -> Vec<Location> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match parse_location_item(item) {
            Ok(location) => Some(location),
            Err(e) => {
                tracing::warn!("Skipping location {}: {}", index, e);
                None
            }
        })
        .collect()
}

/// Map one raw category record. The id must be an integer.
pub fn parse_category(raw: &Value) -> Result<Category, ItemError> {
    let item = raw
        .as_object()
        .ok_or_else(|| ItemError::NotAnObject(json_type(raw)))?;

    let id = match item.get("id") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or(ItemError::InvalidField("id"))?;

    Ok(Category {
        id,
        name: item.get("name").map(text).unwrap_or_default(),
    })
}

/// Map a batch of raw category records, skipping malformed ones.
pub fn parse_categories(items: &[Value]) -> Vec<Category> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match parse_category(item) {
            Ok(category) => Some(category),
            Err(e) => {
                tracing::warn!("Skipping category {}: {}", index, e);
                None
            }
        })
        .collect()
}

/// `€ <price>`, [`PRICE_ON_REQUEST`] for zero, empty when absent.
pub fn format_price(price: Option<&Value>) -> String {
    match price {
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => PRICE_ON_REQUEST.to_string(),
        Some(Value::Number(n)) => format!("€ {n}"),
        Some(Value::String(s)) if s == "0" => PRICE_ON_REQUEST.to_string(),
        Some(Value::String(s)) if !s.is_empty() => format!("€ {s}"),
        _ => String::new(),
    }
}

/// `City, State`, or whichever of the two is present.
pub fn format_location(location: Option<&Value>) -> String {
    let Some(location) = location.and_then(Value::as_object) else {
        return String::new();
    };

    let city = location.get("city").map(text).unwrap_or_default();
    let state = location.get("state").map(text).unwrap_or_default();

    match (city.is_empty(), state.is_empty()) {
        (false, false) => format!("{city}, {state}"),
        (false, true) => city,
        (true, false) => state,
        (true, true) => String::new(),
    }
}

/// Seller name from the seller object, else the `name` on the location object.
pub fn format_seller(seller: Option<&Value>, location: Option<&Value>) -> String {
    [seller, location]
        .into_iter()
        .flatten()
        .filter_map(|obj| obj.get("name").map(text))
        .find(|name| !name.is_empty())
        .unwrap_or_default()
}

/// Shipping flag as display text.
///
/// An explicit `false` reads [`PICKUP_ONLY`] while a missing flag stays
/// empty; the two are kept apart on purpose.
pub fn format_shipping(shipping: Option<&Value>) -> String {
    match shipping {
        Some(Value::Bool(true)) => SHIPPING_AVAILABLE.to_string(),
        Some(Value::Bool(false)) => PICKUP_ONLY.to_string(),
        #[cfg(feature = "shipping-unknown-label")]
        _ => SHIPPING_UNKNOWN.to_string(),
        #[cfg(not(feature = "shipping-unknown-label"))]
        _ => String::new(),
    }
}

/// Public page of a listing; empty for an empty id.
pub fn listing_url(id: &str) -> String {
    if id.is_empty() {
        String::new()
    } else {
        format!("{LISTING_URL_PREFIX}{id}")
    }
}

/// Image URLs in upstream order.
pub fn parse_images(images: Option<&Value>) -> Result<Vec<ListingImage>, ItemError> {
    match images {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(urls)) => urls
            .iter()
            .enumerate()
            .map(|(index, url)| {
                url.as_str()
                    .map(ListingImage::new)
                    .ok_or(ItemError::InvalidImage { index })
            })
            .collect(),
        Some(_) => Err(ItemError::InvalidImages),
    }
}

/// Shorten `text` to `max_length` characters, appending `...` when cut.
pub fn truncate_text(text: &str, max_length: usize) -> String {
    match text.char_indices().nth(max_length) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Strings as-is, numbers in decimal, everything else empty.
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn coordinate(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
