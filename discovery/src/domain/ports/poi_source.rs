//! Driven port for querying the external point-of-interest service.
//!
//! The domain owns the query shape and the raw element contract; adapters own
//! the query language, transport, and JSON decoding.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{Coordinates, PlaceCategory, SearchRadius};

/// Radius query for eateries around one position.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyPoiQuery {
    /// Centre of the search.
    pub center: Coordinates,
    /// Search radius.
    pub radius: SearchRadius,
    /// Categories to select; each maps to one `amenity` tag value.
    pub categories: Vec<PlaceCategory>,
}

impl NearbyPoiQuery {
    /// Query for both restaurants and cafes.
    pub fn eateries(center: Coordinates, radius: SearchRadius) -> Self {
        Self {
            center,
            radius,
            categories: vec![PlaceCategory::Restaurant, PlaceCategory::Cafe],
        }
    }
}

/// One raw feature returned by the POI service.
///
/// Tags are kept verbatim; normalisation happens in the domain.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawPoiElement {
    /// Source element type (`node`, `way`, ...), when reported.
    pub element_type: Option<String>,
    /// Source numeric identifier.
    pub element_id: i64,
    /// Direct point or area centroid; `None` when neither was usable.
    pub coordinates: Option<Coordinates>,
    /// Raw source tags.
    pub tags: BTreeMap<String, String>,
}

impl RawPoiElement {
    /// Look up a tag, ignoring blank values.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(String::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

define_port_error! {
    /// Errors surfaced while calling the POI service.
    pub enum PoiSourceError {
        /// Network transport failed before a response arrived.
        Transport { message: String } =>
            "poi source transport failed: {message}",
        /// The call exceeded its timeout.
        Timeout { message: String } =>
            "poi source timed out: {message}",
        /// The service answered with a non-success status.
        Status { status: u16, message: String } =>
            "poi source returned status {status}: {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "poi source response decode failed: {message}",
        /// The adapter rejected the query before sending it.
        InvalidRequest { message: String } =>
            "poi source request invalid: {message}",
    }
}

/// Port for fetching raw eatery features around a position.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoiSource: Send + Sync {
    /// Fetch raw elements matching `query`. Order is unspecified.
    async fn fetch_elements(
        &self,
        query: &NearbyPoiQuery,
    ) -> Result<Vec<RawPoiElement>, PoiSourceError>;
}

/// Fixture implementation returning a fixed element list.
#[derive(Debug, Clone, Default)]
pub struct FixturePoiSource {
    elements: Vec<RawPoiElement>,
}

impl FixturePoiSource {
    /// Serve `elements` for every query.
    pub fn new(elements: Vec<RawPoiElement>) -> Self {
        Self { elements }
    }
}

#[async_trait]
impl PoiSource for FixturePoiSource {
    async fn fetch_elements(
        &self,
        _query: &NearbyPoiQuery,
    ) -> Result<Vec<RawPoiElement>, PoiSourceError> {
        Ok(self.elements.clone())
    }
}
