//! The place catalog: authoritative ranked list plus the derived view.
//!
//! The catalog owns three inputs (all places, search term, category filter)
//! and re-derives the visible list from scratch whenever any of them changes.
//! Snapshots are published on a `watch` channel for the presentation layer.
//!
//! Reloads run the pipeline geo query → ranking → rating aggregation and then
//! replace the place list in one assignment. Each reload takes a generation
//! ticket when it starts; a reload never overwrites a list committed by a
//! reload that started after it. On failure the previous list stays in place.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::ports::{PoiSource, PositionProvider, ReviewStore};
use super::{
    Coordinates, DiscoveryError, GeoQueryService, Place, RatingAggregator,
    RatingAggregatorConfig, SearchRadius, rank_by_distance,
};

mod view;

pub use view::{CategoryFilter, UnknownCategoryFilter, derive_visible};

/// Port bundle required by the catalog.
pub struct PlaceCatalogPorts {
    /// Device position source.
    pub position: Arc<dyn PositionProvider>,
    /// External POI query adapter.
    pub poi_source: Arc<dyn PoiSource>,
    /// Review store read for rating aggregates.
    pub review_store: Arc<dyn ReviewStore>,
}

/// Catalog tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaceCatalogConfig {
    /// Search radius for every reload.
    pub radius: SearchRadius,
    /// Rating fan-out settings.
    pub ratings: RatingAggregatorConfig,
}

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogSnapshot {
    /// Filtered, distance-ordered places.
    pub visible_places: Vec<Place>,
    /// True while at least one reload is in flight.
    pub loading: bool,
    /// Failure of the latest reload, cleared by the next success.
    pub last_error: Option<DiscoveryError>,
}

/// Result of a reload that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The new list replaced the catalog contents.
    Applied {
        /// Number of places loaded.
        place_count: usize,
    },
    /// A reload started later had already committed; this result was dropped.
    Superseded,
}

#[derive(Debug, Default)]
struct CatalogState {
    all_places: Vec<Place>,
    search_term: String,
    category_filter: CategoryFilter,
    in_flight: usize,
    next_ticket: u64,
    committed_ticket: u64,
    last_error: Option<DiscoveryError>,
}

impl CatalogState {
    fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            visible_places: derive_visible(
                &self.all_places,
                &self.search_term,
                self.category_filter,
            ),
            loading: self.in_flight > 0,
            last_error: self.last_error.clone(),
        }
    }
}

/// Orchestrating state for nearby place discovery.
pub struct PlaceCatalog {
    position: Arc<dyn PositionProvider>,
    geo_query: GeoQueryService,
    aggregator: RatingAggregator,
    radius: SearchRadius,
    state: Mutex<CatalogState>,
    snapshots: watch::Sender<CatalogSnapshot>,
}

impl PlaceCatalog {
    /// Build an empty catalog.
    pub fn new(ports: PlaceCatalogPorts, config: PlaceCatalogConfig) -> Self {
        let PlaceCatalogPorts {
            position,
            poi_source,
            review_store,
        } = ports;
        let (snapshots, _) = watch::channel(CatalogSnapshot::default());
        Self {
            position,
            geo_query: GeoQueryService::new(poi_source),
            aggregator: RatingAggregator::new(review_store, config.ratings),
            radius: config.radius,
            state: Mutex::new(CatalogState::default()),
            snapshots,
        }
    }

    /// Reload around the device's current position.
    ///
    /// A denied or failed position fix is a load failure; the previous list is
    /// kept.
    pub async fn reload(&self) -> Result<ReloadOutcome, DiscoveryError> {
        let ticket = self.begin_reload();
        let started = Instant::now();
        let result = match self.position.current_position().await {
            Ok(position) => self.run_pipeline(position).await,
            Err(error) => Err(DiscoveryError::from(error)),
        };
        self.finish_reload(ticket, started, result)
    }

    /// Reload around an explicit position.
    pub async fn reload_at(&self, position: Coordinates) -> Result<ReloadOutcome, DiscoveryError> {
        let ticket = self.begin_reload();
        let started = Instant::now();
        let result = self.run_pipeline(position).await;
        self.finish_reload(ticket, started, result)
    }

    /// Update the search term and re-derive the view. No I/O.
    pub fn set_search_term(&self, term: impl Into<String>) {
        let mut state = self.lock_state();
        state.search_term = term.into();
        self.publish(&state);
    }

    /// Update the category filter and re-derive the view. No I/O.
    pub fn set_category_filter(&self, filter: CategoryFilter) {
        let mut state = self.lock_state();
        state.category_filter = filter;
        self.publish(&state);
    }

    /// Current filtered list.
    pub fn visible_places(&self) -> Vec<Place> {
        self.snapshots.borrow().visible_places.clone()
    }

    /// Full ranked list from the last successful reload.
    pub fn all_places(&self) -> Vec<Place> {
        self.lock_state().all_places.clone()
    }

    /// Whether a reload is in flight.
    pub fn is_loading(&self) -> bool {
        self.snapshots.borrow().loading
    }

    /// Failure of the most recent reload, if it failed.
    pub fn last_error(&self) -> Option<DiscoveryError> {
        self.snapshots.borrow().last_error.clone()
    }

    /// Latest snapshot.
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<CatalogSnapshot> {
        self.snapshots.subscribe()
    }

    async fn run_pipeline(&self, position: Coordinates) -> Result<Vec<Place>, DiscoveryError> {
        let candidates = self
            .geo_query
            .fetch_nearby_places(position, self.radius)
            .await?;
        let ranked = rank_by_distance(position, candidates);
        Ok(self.aggregator.attach_ratings(ranked).await)
    }

    fn begin_reload(&self) -> u64 {
        let mut state = self.lock_state();
        state.next_ticket += 1;
        state.in_flight += 1;
        let ticket = state.next_ticket;
        self.publish(&state);
        debug!(ticket, "catalog reload started");
        ticket
    }

    fn finish_reload(
        &self,
        ticket: u64,
        started: Instant,
        result: Result<Vec<Place>, DiscoveryError>,
    ) -> Result<ReloadOutcome, DiscoveryError> {
        let mut state = self.lock_state();
        state.in_flight = state.in_flight.saturating_sub(1);
        let is_current = ticket > state.committed_ticket;

        let outcome = match result {
            Ok(places) if is_current => {
                let place_count = places.len();
                state.all_places = places;
                state.committed_ticket = ticket;
                state.last_error = None;
                Ok(ReloadOutcome::Applied { place_count })
            }
            Ok(_) => Ok(ReloadOutcome::Superseded),
            Err(error) => {
                if is_current {
                    state.last_error = Some(error.clone());
                }
                Err(error)
            }
        };

        self.publish(&state);
        drop(state);

        match &outcome {
            Ok(ReloadOutcome::Applied { place_count }) => info!(
                ticket,
                place_count = *place_count,
                elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                "catalog reload applied"
            ),
            Ok(ReloadOutcome::Superseded) => {
                debug!(ticket, "catalog reload superseded by a newer reload");
            }
            Err(error) => warn!(ticket, %error, "catalog reload failed; keeping previous places"),
        }
        outcome
    }

    fn publish(&self, state: &CatalogState) {
        self.snapshots.send_replace(state.snapshot());
    }

    fn lock_state(&self) -> MutexGuard<'_, CatalogState> {
        // State is only mutated synchronously under the lock, so a poisoned
        // guard still holds a whole value.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
