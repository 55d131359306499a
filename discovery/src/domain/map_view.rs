//! Map projection of the visible places: one marker per place and an initial
//! viewport centred on the nearest one.

use serde::Serialize;

use super::{Coordinates, Place, PlaceId};

/// Latitude and longitude span of the initial viewport, in degrees.
pub const DEFAULT_REGION_DELTA: f64 = 0.02;

/// Visible map rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRegion {
    /// Centre of the viewport.
    pub center: Coordinates,
    /// Latitude span in degrees.
    pub latitude_delta: f64,
    /// Longitude span in degrees.
    pub longitude_delta: f64,
}

impl MapRegion {
    /// Viewport around the first place of a distance-ordered list.
    ///
    /// Returns `None` for an empty list; the map then keeps its own default.
    pub fn around_nearest(places: &[Place]) -> Option<Self> {
        places.first().map(|place| Self {
            center: place.coordinates,
            latitude_delta: DEFAULT_REGION_DELTA,
            longitude_delta: DEFAULT_REGION_DELTA,
        })
    }
}

/// One pin on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    /// Place the pin opens.
    pub place_id: PlaceId,
    /// Pin position.
    pub coordinates: Coordinates,
    /// Pin title.
    pub title: String,
    /// Pin subtitle: the address, or the cuisine when no address is known.
    pub description: Option<String>,
}

impl From<&Place> for MapMarker {
    fn from(place: &Place) -> Self {
        let description = Some(place.address.clone())
            .filter(|address| !address.is_empty())
            .or_else(|| place.cuisine_label());
        Self {
            place_id: place.id.clone(),
            coordinates: place.coordinates,
            title: place.name.clone(),
            description,
        }
    }
}

/// One marker per place, in list order.
pub fn markers_for(places: &[Place]) -> Vec<MapMarker> {
    places.iter().map(MapMarker::from).collect()
}
