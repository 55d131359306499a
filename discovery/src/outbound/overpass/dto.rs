//! DTOs for decoding Overpass JSON responses.
//!
//! The adapter decodes into these transport DTOs first, then maps into raw
//! domain elements in one pass. Positions that fail validation are carried as
//! `None` so the domain can drop the element.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::Coordinates;
use crate::domain::ports::RawPoiElement;

#[derive(Debug, Deserialize)]
pub(super) struct OverpassResponseDto {
    #[serde(default)]
    pub(super) elements: Vec<OverpassElementDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OverpassElementDto {
    #[serde(rename = "type")]
    pub(super) element_type: Option<String>,
    pub(super) id: i64,
    pub(super) lat: Option<f64>,
    pub(super) lon: Option<f64>,
    pub(super) center: Option<OverpassElementCenterDto>,
    #[serde(default)]
    pub(super) tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OverpassElementCenterDto {
    pub(super) lat: f64,
    pub(super) lon: f64,
}

impl OverpassResponseDto {
    pub(super) fn into_raw_elements(self) -> Vec<RawPoiElement> {
        self.elements
            .into_iter()
            .map(OverpassElementDto::into_raw_element)
            .collect()
    }
}

impl OverpassElementDto {
    fn into_raw_element(self) -> RawPoiElement {
        let coordinates = self.coordinates();
        RawPoiElement {
            element_type: self.element_type,
            element_id: self.id,
            coordinates,
            tags: self.tags,
        }
    }

    /// Direct point first, then the area centroid.
    fn coordinates(&self) -> Option<Coordinates> {
        let direct = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon).ok(),
            _ => None,
        };
        direct.or_else(|| {
            self.center
                .as_ref()
                .and_then(|center| Coordinates::new(center.lat, center.lon).ok())
        })
    }
}
