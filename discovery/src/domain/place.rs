//! Place entities produced by the discovery pipeline.
//!
//! A [`PlaceCandidate`] is the normalised record coming out of the POI query;
//! ranking turns it into a [`Place`] with a distance, and rating aggregation
//! attaches a [`RatingSummary`].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geo::Coordinates;

/// Display name used when the source record carries no `name` tag.
pub const UNNAMED_PLACE: &str = "Unnamed";

/// Validation errors returned by [`PlaceId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaceIdValidationError {
    /// The identifier is blank.
    #[error("place id must not be empty")]
    Empty,
    /// The identifier contains whitespace or path separators.
    #[error("place id must not contain whitespace or '/'")]
    InvalidCharacters,
}

/// Stable identifier of a place within a session.
///
/// Ids are derived from the source element (`node-123`, `way-456`) so they are
/// safe to embed in storage keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlaceId(String);

impl PlaceId {
    /// Validate and construct a [`PlaceId`].
    pub fn new(id: impl Into<String>) -> Result<Self, PlaceIdValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(PlaceIdValidationError::Empty);
        }
        if id.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(PlaceIdValidationError::InvalidCharacters);
        }
        Ok(Self(id))
    }

    /// Derive the canonical id for a source element.
    ///
    /// # Examples
    /// ```
    /// use discovery::domain::PlaceId;
    ///
    /// assert_eq!(PlaceId::from_element(Some("way"), 42).as_ref(), "way-42");
    /// assert_eq!(PlaceId::from_element(None, 42).as_ref(), "42");
    /// ```
    pub fn from_element(element_type: Option<&str>, element_id: i64) -> Self {
        match element_type.map(str::trim).filter(|kind| !kind.is_empty()) {
            Some(kind) => Self(format!("{kind}-{element_id}")),
            None => Self(element_id.to_string()),
        }
    }
}

impl AsRef<str> for PlaceId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PlaceId> for String {
    fn from(value: PlaceId) -> Self {
        value.0
    }
}

impl TryFrom<String> for PlaceId {
    type Error = PlaceIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Kind of eatery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceCategory {
    /// Anything not explicitly tagged as a cafe.
    Restaurant,
    /// Explicitly tagged `amenity=cafe`.
    Cafe,
}

impl PlaceCategory {
    /// Derive the category from a source `amenity` tag.
    pub fn from_amenity(amenity: Option<&str>) -> Self {
        match amenity.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("cafe") => Self::Cafe,
            _ => Self::Restaurant,
        }
    }

    /// Source tag value selecting this category.
    pub const fn amenity_tag(self) -> &'static str {
        match self {
            Self::Restaurant => "restaurant",
            Self::Cafe => "cafe",
        }
    }
}

/// Normalised place skeleton produced by the POI query, before ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceCandidate {
    /// Canonical place id.
    pub id: PlaceId,
    /// Display name.
    pub name: String,
    /// Resolved position.
    pub coordinates: Coordinates,
    /// Best-effort street address; may be empty.
    pub address: String,
    /// Restaurant or cafe.
    pub category: PlaceCategory,
    /// Raw cuisine tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    /// Raw opening hours tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
}

/// Aggregate of a place's review ratings.
///
/// Only exists for places with at least one review, so "no reviews yet" is
/// represented by the absence of a summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RatingSummaryDto")]
pub struct RatingSummary {
    average: f64,
    count: u32,
}

/// Validation errors for decoded [`RatingSummary`] values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RatingSummaryValidationError {
    /// A summary must cover at least one review.
    #[error("rating summary must count at least one review")]
    NoReviews,
    /// The average is not a finite star value.
    #[error("rating average {0} is outside 1..=5")]
    AverageOutOfRange(f64),
}

#[derive(Deserialize)]
struct RatingSummaryDto {
    average: f64,
    count: u32,
}

impl TryFrom<RatingSummaryDto> for RatingSummary {
    type Error = RatingSummaryValidationError;

    fn try_from(value: RatingSummaryDto) -> Result<Self, Self::Error> {
        if value.count == 0 {
            return Err(RatingSummaryValidationError::NoReviews);
        }
        if !value.average.is_finite() || !(1.0..=5.0).contains(&value.average) {
            return Err(RatingSummaryValidationError::AverageOutOfRange(value.average));
        }
        Ok(Self {
            average: value.average,
            count: value.count,
        })
    }
}

impl RatingSummary {
    /// Reduce raw ratings to a summary; `None` for an empty set.
    ///
    /// The average is rounded to one decimal place.
    ///
    /// # Examples
    /// ```
    /// use discovery::domain::RatingSummary;
    ///
    /// let summary = RatingSummary::from_ratings(&[4, 5, 5]).expect("non-empty");
    /// assert_eq!(summary.average(), 4.7);
    /// assert_eq!(summary.count(), 3);
    /// assert!(RatingSummary::from_ratings(&[]).is_none());
    /// ```
    pub fn from_ratings(ratings: &[u8]) -> Option<Self> {
        if ratings.is_empty() {
            return None;
        }
        let count = u32::try_from(ratings.len()).unwrap_or(u32::MAX);
        let total: f64 = ratings.iter().copied().map(f64::from).sum();
        let mean = total / f64::from(count);
        Some(Self {
            average: round_to_tenth(mean),
            count,
        })
    }

    /// Mean rating rounded to one decimal.
    pub fn average(&self) -> f64 {
        self.average
    }

    /// Number of reviews contributing to the average.
    pub fn count(&self) -> u32 {
        self.count
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// A ranked place, as shown to the user.
///
/// ## Invariants
/// - `distance_km` is non-negative and only comparable within one load.
/// - `avg_rating()` is present exactly when `review_count() > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// Canonical place id.
    pub id: PlaceId,
    /// Display name.
    pub name: String,
    /// Resolved position.
    pub coordinates: Coordinates,
    /// Best-effort street address; may be empty.
    pub address: String,
    /// Restaurant or cafe.
    pub category: PlaceCategory,
    /// Raw cuisine tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    /// Raw opening hours tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
    /// Great-circle distance from the user fix used for this load.
    pub distance_km: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rating: Option<RatingSummary>,
}

impl Place {
    /// Promote a candidate with its computed distance and no ratings yet.
    pub fn from_candidate(candidate: PlaceCandidate, distance_km: f64) -> Self {
        let PlaceCandidate {
            id,
            name,
            coordinates,
            address,
            category,
            cuisine,
            opening_hours,
        } = candidate;
        Self {
            id,
            name,
            coordinates,
            address,
            category,
            cuisine,
            opening_hours,
            distance_km: distance_km.max(0.0),
            rating: None,
        }
    }

    /// Attach (or clear) the aggregated rating.
    pub fn set_rating(&mut self, rating: Option<RatingSummary>) {
        self.rating = rating;
    }

    /// Average rating rounded to one decimal; `None` means no reviews yet.
    pub fn avg_rating(&self) -> Option<f64> {
        self.rating.map(|summary| summary.average())
    }

    /// Number of reviews; zero when none exist.
    pub fn review_count(&self) -> u32 {
        self.rating.map_or(0, |summary| summary.count())
    }

    /// Cuisine tag with OSM's `;` separators rendered as a readable list.
    pub fn cuisine_label(&self) -> Option<String> {
        self.cuisine.as_deref().map(|raw| {
            raw.split(';')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(", ")
        })
    }

    /// Distance rendered with two decimals, e.g. `1.23 km`.
    pub fn distance_label(&self) -> String {
        format!("{:.2} km", self.distance_km)
    }

    /// Star badge such as `★ 4.7 (3)`, only when ratings exist.
    pub fn rating_label(&self) -> Option<String> {
        self.rating
            .map(|summary| format!("★ {:.1} ({})", summary.average(), summary.count()))
    }
}
