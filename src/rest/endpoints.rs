//! Kleinanzeigen API endpoint constants.

/// Base URL of the hosted API.
pub const DEFAULT_BASE_URL: &str = "https://api.kleinanzeigen-agent.de";

/// Search listings.
pub const SEARCH: &str = "/ads/v1/kleinanzeigen/search";
/// Single listing by id.
pub const LISTING: &str = "/ads/v1/kleinanzeigen/inserat";
/// Search locations.
pub const LOCATIONS: &str = "/ads/v1/kleinanzeigen/locations";
/// All categories.
pub const CATEGORIES: &str = "/ads/v1/kleinanzeigen/categories";
/// API documentation.
pub const DOCS: &str = "/docs";

/// Most results the search endpoint returns per request.
pub const API_MAX_LIMIT: u32 = 10;
