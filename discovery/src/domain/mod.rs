//! Domain model and services for nearby place discovery and reviews.
//!
//! Purpose: turn raw point-of-interest results into a de-duplicated,
//! distance-ranked, filterable list of places, join that list with review
//! aggregates, and record new reviews. All I/O goes through the driven ports
//! in [`ports`]; nothing here knows about HTTP, files, or the terminal.
//!
//! Public surface:
//! - `GeoQueryService` normalises raw POI elements into `PlaceCandidate`s.
//! - `rank_by_distance` orders candidates by great-circle distance.
//! - `RatingAggregator` attaches `RatingSummary` values with bounded fan-out.
//! - `PlaceCatalog` owns the ranked list and the derived visible view.
//! - `ReviewLedger` lists and submits reviews.

mod catalog;
mod error;
mod geo;
mod geo_query;
mod map_view;
mod place;
pub mod ports;
mod ranking;
mod ratings;
mod reviews;

pub use self::catalog::{
    CatalogSnapshot, CategoryFilter, PlaceCatalog, PlaceCatalogConfig, PlaceCatalogPorts,
    ReloadOutcome, UnknownCategoryFilter, derive_visible,
};
pub use self::error::DiscoveryError;
pub use self::geo::{
    Coordinates, CoordinatesValidationError, DEFAULT_SEARCH_RADIUS_METERS, EARTH_RADIUS_KM,
    SearchRadius, haversine_km,
};
pub use self::geo_query::{GeoQueryService, normalize_element, normalize_elements};
pub use self::map_view::{DEFAULT_REGION_DELTA, MapMarker, MapRegion, markers_for};
pub use self::place::{
    Place, PlaceCandidate, PlaceCategory, PlaceId, PlaceIdValidationError, RatingSummary,
    RatingSummaryValidationError, UNNAMED_PLACE,
};
pub use self::ranking::rank_by_distance;
pub use self::ratings::{RatingAggregator, RatingAggregatorConfig};
pub use self::reviews::{
    MAX_RATING, MIN_RATING, NewReviewDocument, PhotoHandle, PhotoKey, Rating, Review,
    ReviewAuthor, ReviewDraft, ReviewError, ReviewId, ReviewLedger, ReviewLedgerPorts,
    recipients_for, sort_newest_first,
};
