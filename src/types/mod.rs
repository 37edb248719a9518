//! Request and response types shared across the client.

pub mod envelope;
pub mod listing;
pub mod search;

pub use envelope::Envelope;
pub use listing::{Category, Listing, ListingImage, Location};
pub use search::{ListingDetailRequest, LocationsRequest, SearchParams, SearchRequest, SortOrder};
