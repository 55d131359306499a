//! Pure derivation of the visible place list from the catalog inputs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{Place, PlaceCategory};

/// Category selector applied to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    /// Keep every place.
    #[default]
    All,
    /// Keep restaurants only.
    Restaurant,
    /// Keep cafes only.
    Cafe,
}

impl CategoryFilter {
    /// Whether a place of `category` passes this filter.
    pub fn admits(self, category: PlaceCategory) -> bool {
        match self {
            Self::All => true,
            Self::Restaurant => category == PlaceCategory::Restaurant,
            Self::Cafe => category == PlaceCategory::Cafe,
        }
    }
}

/// Error returned when parsing an unknown filter name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category filter '{0}'; expected all, restaurant, or cafe")]
pub struct UnknownCategoryFilter(String);

impl FromStr for CategoryFilter {
    type Err = UnknownCategoryFilter;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "restaurant" => Ok(Self::Restaurant),
            "cafe" => Ok(Self::Cafe),
            _ => Err(UnknownCategoryFilter(raw.to_owned())),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Restaurant => "restaurant",
            Self::Cafe => "cafe",
        })
    }
}

/// Derive the visible list: category filter, then case-insensitive substring
/// search over name, address, and cuisine.
///
/// The result is a subsequence of `all_places`; filtering never reorders.
///
/// # Examples
/// ```
/// use discovery::domain::{CategoryFilter, derive_visible};
///
/// assert!(derive_visible(&[], "pizza", CategoryFilter::Cafe).is_empty());
/// ```
pub fn derive_visible(
    all_places: &[Place],
    search_term: &str,
    filter: CategoryFilter,
) -> Vec<Place> {
    let needle = search_term.trim().to_lowercase();
    all_places
        .iter()
        .filter(|place| filter.admits(place.category))
        .filter(|place| needle.is_empty() || matches_search(place, &needle))
        .cloned()
        .collect()
}

fn matches_search(place: &Place, needle: &str) -> bool {
    [
        Some(place.name.as_str()),
        Some(place.address.as_str()),
        place.cuisine.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}
