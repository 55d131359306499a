//! Per-place rating aggregation.
//!
//! One review query per place, fanned out with bounded concurrency. A failed
//! or timed-out query only affects its own place, which falls back to "no
//! reviews"; the aggregate always waits for every place before returning.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{StreamExt, stream};
use thiserror::Error;
use tracing::warn;

use super::ports::{ReviewOrder, ReviewStore, ReviewStoreError};
use super::{Place, PlaceId, RatingSummary};

/// Tuning for [`RatingAggregator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingAggregatorConfig {
    /// Maximum review queries in flight at once.
    pub max_concurrent_queries: usize,
    /// Per-place query timeout.
    pub query_timeout: Duration,
}

impl Default for RatingAggregatorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_queries: 8,
            query_timeout: Duration::from_secs(10),
        }
    }
}

/// Why one place's ratings could not be fetched.
#[derive(Debug, Error)]
enum RatingFetchFailed {
    #[error(transparent)]
    Store(#[from] ReviewStoreError),
    #[error("review query timed out after {0:?}")]
    TimedOut(Duration),
}

/// Joins places with the aggregate of their stored reviews.
#[derive(Clone)]
pub struct RatingAggregator {
    store: Arc<dyn ReviewStore>,
    config: RatingAggregatorConfig,
}

impl RatingAggregator {
    /// Build an aggregator reading from `store`.
    pub fn new(store: Arc<dyn ReviewStore>, config: RatingAggregatorConfig) -> Self {
        Self { store, config }
    }

    /// Attach `avg_rating`/`review_count` to every place.
    ///
    /// Order is preserved. Never fails: a place whose reviews cannot be read
    /// is returned without a rating.
    pub async fn attach_ratings(&self, places: Vec<Place>) -> Vec<Place> {
        let width = self.config.max_concurrent_queries.max(1);
        stream::iter(places)
            .map(|mut place| async move {
                let rating = self.rating_for(&place.id).await;
                place.set_rating(rating);
                place
            })
            .buffered(width)
            .collect()
            .await
    }

    async fn rating_for(&self, place_id: &PlaceId) -> Option<RatingSummary> {
        match self.fetch_ratings(place_id).await {
            Ok(ratings) => RatingSummary::from_ratings(&ratings),
            Err(error) => {
                warn!(place_id = %place_id, %error, "rating fetch failed; showing no reviews");
                None
            }
        }
    }

    async fn fetch_ratings(&self, place_id: &PlaceId) -> Result<Vec<u8>, RatingFetchFailed> {
        let query = self.store.reviews_for_place(place_id, ReviewOrder::Unordered);
        let reviews = tokio::time::timeout(self.config.query_timeout, query)
            .await
            .map_err(|_| RatingFetchFailed::TimedOut(self.config.query_timeout))??;
        Ok(reviews.into_iter().map(|review| review.rating).collect())
    }
}

#[cfg(test)]
mod tests {
    //! Aggregation maths, fallbacks, and fan-out behaviour.

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::domain::ports::MockReviewStore;
    use crate::domain::{
        Coordinates, NewReviewDocument, PlaceCandidate, PlaceCategory, Review, ReviewId,
    };

    fn place(id: &str) -> Place {
        Place::from_candidate(
            PlaceCandidate {
                id: PlaceId::new(id).expect("valid id"),
                name: id.to_owned(),
                coordinates: Coordinates::new(60.17, 24.94).expect("valid"),
                address: String::new(),
                category: PlaceCategory::Restaurant,
                cuisine: None,
                opening_hours: None,
            },
            0.1,
        )
    }

    fn review(place_id: &PlaceId, rating: u8) -> Review {
        Review {
            id: ReviewId::new(format!("{place_id}-{rating}")),
            place_id: place_id.clone(),
            rating,
            comment: "ok".to_owned(),
            image_url: None,
            author: None,
            created_at: None,
        }
    }

    fn aggregator(store: impl ReviewStore + 'static) -> RatingAggregator {
        RatingAggregator::new(Arc::new(store), RatingAggregatorConfig::default())
    }

    #[tokio::test]
    async fn averages_ratings_and_leaves_unreviewed_places_empty() {
        let mut store = MockReviewStore::new();
        store
            .expect_reviews_for_place()
            .withf(|_, order| *order == ReviewOrder::Unordered)
            .times(2)
            .returning(|place_id, _| {
                if place_id.as_ref() == "node-1" {
                    Ok(vec![review(place_id, 4), review(place_id, 5), review(place_id, 5)])
                } else {
                    Ok(Vec::new())
                }
            });

        let places = aggregator(store)
            .attach_ratings(vec![place("node-1"), place("node-2")])
            .await;

        assert_eq!(places[0].avg_rating(), Some(4.7));
        assert_eq!(places[0].review_count(), 3);
        assert_eq!(places[1].avg_rating(), None);
        assert_eq!(places[1].review_count(), 0);
    }

    #[tokio::test]
    async fn failed_query_falls_back_for_that_place_only() {
        let mut store = MockReviewStore::new();
        store.expect_reviews_for_place().returning(|place_id, _| {
            if place_id.as_ref() == "node-bad" {
                Err(ReviewStoreError::query("index missing"))
            } else {
                Ok(vec![review(place_id, 3)])
            }
        });

        let places = aggregator(store)
            .attach_ratings(vec![place("node-ok"), place("node-bad"), place("node-ok2")])
            .await;

        let counts = places.iter().map(Place::review_count).collect::<Vec<_>>();
        assert_eq!(counts, [1, 0, 1]);
        assert!(places[1].avg_rating().is_none());
    }

    #[tokio::test]
    async fn stale_rating_is_cleared_on_fallback() {
        let mut store = MockReviewStore::new();
        store
            .expect_reviews_for_place()
            .returning(|_, _| Err(ReviewStoreError::connection("offline")));

        let mut rated = place("node-1");
        rated.set_rating(RatingSummary::from_ratings(&[5]));
        let places = aggregator(store).attach_ratings(vec![rated]).await;

        assert_eq!(places[0].review_count(), 0);
    }

    struct SlowStore {
        delays: HashMap<String, Duration>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl SlowStore {
        fn new(delays: &[(&str, Duration)]) -> Self {
            Self {
                delays: delays
                    .iter()
                    .map(|(id, delay)| ((*id).to_owned(), *delay))
                    .collect(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ReviewStore for SlowStore {
        async fn reviews_for_place(
            &self,
            place_id: &PlaceId,
            _order: ReviewOrder,
        ) -> Result<Vec<Review>, ReviewStoreError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            let delay = self
                .delays
                .get(place_id.as_ref())
                .copied()
                .unwrap_or(Duration::from_millis(5));
            tokio::time::sleep(delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![review(place_id, 4)])
        }

        async fn append(
            &self,
            _document: &NewReviewDocument,
        ) -> Result<ReviewId, ReviewStoreError> {
            Err(ReviewStoreError::write("read-only"))
        }
    }

    #[tokio::test]
    async fn queries_run_concurrently_and_keep_order() {
        let store = Arc::new(SlowStore::new(&[("node-1", Duration::from_millis(40))]));
        let aggregator = RatingAggregator::new(
            store.clone(),
            RatingAggregatorConfig {
                max_concurrent_queries: 4,
                query_timeout: Duration::from_secs(5),
            },
        );

        let places = aggregator
            .attach_ratings(vec![place("node-1"), place("node-2"), place("node-3")])
            .await;

        let ids = places.iter().map(|p| p.id.as_ref()).collect::<Vec<_>>();
        assert_eq!(ids, ["node-1", "node-2", "node-3"]);
        assert!(places.iter().all(|p| p.review_count() == 1));
        assert!(store.peak.load(Ordering::SeqCst) > 1, "queries should overlap");
    }

    #[tokio::test]
    async fn concurrency_width_is_respected() {
        let store = Arc::new(SlowStore::new(&[]));
        let aggregator = RatingAggregator::new(
            store.clone(),
            RatingAggregatorConfig {
                max_concurrent_queries: 2,
                query_timeout: Duration::from_secs(5),
            },
        );

        let places = (1..=6).map(|n| place(&format!("node-{n}"))).collect();
        let _ = aggregator.attach_ratings(places).await;

        assert!(store.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn timed_out_query_falls_back() {
        let store = SlowStore::new(&[("node-slow", Duration::from_secs(30))]);
        let aggregator = RatingAggregator::new(
            Arc::new(store),
            RatingAggregatorConfig {
                max_concurrent_queries: 4,
                query_timeout: Duration::from_millis(20),
            },
        );

        let places = aggregator
            .attach_ratings(vec![place("node-slow"), place("node-fast")])
            .await;

        assert_eq!(places[0].review_count(), 0);
        assert_eq!(places[1].review_count(), 1);
    }
}
