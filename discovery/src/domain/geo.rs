//! Geographic primitives: validated WGS84 coordinates, the search radius, and
//! great-circle distance.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by [`haversine_km`], in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default discovery radius in metres.
pub const DEFAULT_SEARCH_RADIUS_METERS: u32 = 10_000;

/// Validation errors returned by [`Coordinates::new`].
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CoordinatesValidationError {
    /// Latitude or longitude is NaN or infinite.
    #[error("coordinates must be finite")]
    NonFinite,
    /// Latitude lies outside `[-90, 90]`.
    #[error("latitude {0} must be within [-90, 90]")]
    LatitudeOutOfRange(f64),
    /// Longitude lies outside `[-180, 180]`.
    #[error("longitude {0} must be within [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A WGS84 position.
///
/// ## Invariants
/// - Both components are finite.
/// - Latitude is within `[-90, 90]`, longitude within `[-180, 180]`.
///
/// # Examples
/// ```
/// use discovery::domain::Coordinates;
///
/// let helsinki = Coordinates::new(60.1699, 24.9384).expect("valid position");
/// assert_eq!(helsinki.latitude(), 60.1699);
/// assert!(Coordinates::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CoordinatesDto", into = "CoordinatesDto")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validate and construct a position.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinatesValidationError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinatesValidationError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinatesValidationError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinatesValidationError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_km(&self, other: &Self) -> f64 {
        haversine_km(*self, *other)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct CoordinatesDto {
    latitude: f64,
    longitude: f64,
}

impl From<Coordinates> for CoordinatesDto {
    fn from(value: Coordinates) -> Self {
        Self {
            latitude: value.latitude,
            longitude: value.longitude,
        }
    }
}

impl TryFrom<CoordinatesDto> for Coordinates {
    type Error = CoordinatesValidationError;

    fn try_from(value: CoordinatesDto) -> Result<Self, Self::Error> {
        Self::new(value.latitude, value.longitude)
    }
}

/// Great-circle distance between two positions using the haversine formula.
///
/// The spherical approximation is accurate enough at neighbourhood scale; no
/// ellipsoidal correction is applied.
///
/// # Examples
/// ```
/// use discovery::domain::{Coordinates, haversine_km};
///
/// let a = Coordinates::new(60.1699, 24.9384).expect("valid");
/// assert_eq!(haversine_km(a, a), 0.0);
/// ```
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Radius of a nearby search, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SearchRadius(u32);

impl SearchRadius {
    /// Build a radius, clamping zero up to one metre.
    pub fn from_meters(meters: u32) -> Self {
        Self(meters.max(1))
    }

    /// Radius in metres.
    pub fn meters(self) -> u32 {
        self.0
    }
}

impl Default for SearchRadius {
    fn default() -> Self {
        Self(DEFAULT_SEARCH_RADIUS_METERS)
    }
}
