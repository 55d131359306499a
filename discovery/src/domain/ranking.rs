//! Distance ranking of normalised candidates relative to one user fix.

use super::{Coordinates, Place, PlaceCandidate, haversine_km};

/// Compute each candidate's distance from `position` and sort ascending.
///
/// The sort is stable, so equidistant places keep their input order. Pure: no
/// I/O and no shared state.
///
/// # Examples
/// ```
/// use discovery::domain::{Coordinates, PlaceCandidate, PlaceCategory, PlaceId, rank_by_distance};
///
/// let here = Coordinates::new(60.17, 24.94).expect("valid");
/// let candidate = |id: i64, lat: f64| PlaceCandidate {
///     id: PlaceId::from_element(Some("node"), id),
///     name: format!("place {id}"),
///     coordinates: Coordinates::new(lat, 24.94).expect("valid"),
///     address: String::new(),
///     category: PlaceCategory::Restaurant,
///     cuisine: None,
///     opening_hours: None,
/// };
/// let ranked = rank_by_distance(here, vec![candidate(1, 60.20), candidate(2, 60.18)]);
/// assert_eq!(ranked[0].id.as_ref(), "node-2");
/// ```
pub fn rank_by_distance(position: Coordinates, candidates: Vec<PlaceCandidate>) -> Vec<Place> {
    let mut places = candidates
        .into_iter()
        .map(|candidate| {
            let distance_km = haversine_km(position, candidate.coordinates);
            Place::from_candidate(candidate, distance_km)
        })
        .collect::<Vec<_>>();
    places.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    places
}
