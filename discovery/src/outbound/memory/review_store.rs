//! Review store held in a mutex-guarded vector.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{ReviewOrder, ReviewStore, ReviewStoreError};
use crate::domain::{NewReviewDocument, PlaceId, Review, ReviewId, sort_newest_first};

/// Append-only review store kept in memory.
///
/// Ids are random UUIDs and `created_at` comes from the injected clock, which
/// stands in for the server timestamp of a hosted store.
pub struct InMemoryReviewStore {
    reviews: Mutex<Vec<Review>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryReviewStore {
    /// Empty store stamping reviews with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_reviews(clock, Vec::new())
    }

    /// Store pre-seeded with `reviews`.
    pub fn with_reviews(clock: Arc<dyn Clock>, reviews: Vec<Review>) -> Self {
        Self {
            reviews: Mutex::new(reviews),
            clock,
        }
    }

    /// Number of stored reviews across all places.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no review has been stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Review>> {
        self.reviews.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn reviews_for_place(
        &self,
        place_id: &PlaceId,
        order: ReviewOrder,
    ) -> Result<Vec<Review>, ReviewStoreError> {
        let mut matching = self
            .lock()
            .iter()
            .filter(|review| &review.place_id == place_id)
            .cloned()
            .collect::<Vec<_>>();
        if order == ReviewOrder::NewestFirst {
            sort_newest_first(&mut matching);
        }
        Ok(matching)
    }

    async fn append(&self, document: &NewReviewDocument) -> Result<ReviewId, ReviewStoreError> {
        let id = ReviewId::new(Uuid::new_v4().to_string());
        let review = Review {
            id: id.clone(),
            place_id: document.place_id.clone(),
            rating: document.rating.stars(),
            comment: document.comment.clone(),
            image_url: document.image_url.clone(),
            author: document.author.clone(),
            created_at: Some(self.clock.utc()),
        };
        self.lock().push(review);
        Ok(id)
    }
}
