//! Nearby eatery lookup: issues the radius query through [`PoiSource`] and
//! normalises the heterogeneous raw features into [`PlaceCandidate`]s.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use super::ports::{NearbyPoiQuery, PoiSource, RawPoiElement};
use super::{
    Coordinates, DiscoveryError, PlaceCandidate, PlaceCategory, PlaceId, SearchRadius,
    UNNAMED_PLACE,
};

/// Query service wrapping the POI source port.
#[derive(Clone)]
pub struct GeoQueryService {
    source: Arc<dyn PoiSource>,
}

impl GeoQueryService {
    /// Build the service around a POI source adapter.
    pub fn new(source: Arc<dyn PoiSource>) -> Self {
        Self { source }
    }

    /// Fetch restaurants and cafes within `radius` of `position`.
    ///
    /// Output ids are unique; order is unspecified. Any source failure is
    /// reported as [`DiscoveryError::SourceUnavailable`].
    pub async fn fetch_nearby_places(
        &self,
        position: Coordinates,
        radius: SearchRadius,
    ) -> Result<Vec<PlaceCandidate>, DiscoveryError> {
        let query = NearbyPoiQuery::eateries(position, radius);
        let elements = self.source.fetch_elements(&query).await?;
        let raw_count = elements.len();
        let candidates = normalize_elements(elements);
        debug!(
            raw_count,
            kept = candidates.len(),
            radius_m = radius.meters(),
            "normalised nearby poi elements"
        );
        Ok(candidates)
    }
}

/// Normalise raw features, dropping unlocated ones and duplicate ids.
///
/// The first occurrence of an id wins.
pub fn normalize_elements(elements: Vec<RawPoiElement>) -> Vec<PlaceCandidate> {
    let mut seen = HashSet::with_capacity(elements.len());
    elements
        .into_iter()
        .filter_map(normalize_element)
        .filter(|candidate| seen.insert(candidate.id.clone()))
        .collect()
}

/// Normalise one raw feature; `None` when it carries no usable position.
pub fn normalize_element(element: RawPoiElement) -> Option<PlaceCandidate> {
    let coordinates = element.coordinates?;
    let id = PlaceId::from_element(element.element_type.as_deref(), element.element_id);
    let name = element.tag("name").unwrap_or(UNNAMED_PLACE).to_owned();
    let address = compose_address(&element);
    let category = PlaceCategory::from_amenity(element.tag("amenity"));
    let cuisine = element.tag("cuisine").map(str::to_owned);
    let opening_hours = element.tag("opening_hours").map(str::to_owned);

    Some(PlaceCandidate {
        id,
        name,
        coordinates,
        address,
        category,
        cuisine,
        opening_hours,
    })
}

fn compose_address(element: &RawPoiElement) -> String {
    [element.tag("addr:street"), element.tag("addr:housenumber")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
}
