//! Driven port for the shared review document store.
//!
//! The store is the only state shared across users. It is treated as
//! externally synchronised: appends are last-write-wins and the client does no
//! concurrency control of its own.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{NewReviewDocument, PlaceId, Review, ReviewId};

/// Ordering requested from [`ReviewStore::reviews_for_place`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewOrder {
    /// Whatever order the store returns; enough for aggregation.
    #[default]
    Unordered,
    /// `created_at` descending.
    NewestFirst,
}

define_port_error! {
    /// Errors raised by review store adapters.
    pub enum ReviewStoreError {
        /// The store could not be reached.
        Connection { message: String } =>
            "review store connection failed: {message}",
        /// A read query failed.
        Query { message: String } =>
            "review store query failed: {message}",
        /// An append was rejected.
        Write { message: String } =>
            "review store write failed: {message}",
    }
}

/// Port for reading and appending review documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// All reviews whose `place_id` equals `place_id`.
    ///
    /// Returns an empty list, never an error, when the place has no reviews.
    async fn reviews_for_place(
        &self,
        place_id: &PlaceId,
        order: ReviewOrder,
    ) -> Result<Vec<Review>, ReviewStoreError>;

    /// Append a review; the store assigns the id and creation timestamp.
    async fn append(&self, document: &NewReviewDocument) -> Result<ReviewId, ReviewStoreError>;
}

/// Fixture implementation holding no reviews and discarding appends.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureReviewStore;

#[async_trait]
impl ReviewStore for FixtureReviewStore {
    async fn reviews_for_place(
        &self,
        _place_id: &PlaceId,
        _order: ReviewOrder,
    ) -> Result<Vec<Review>, ReviewStoreError> {
        Ok(Vec::new())
    }

    async fn append(&self, _document: &NewReviewDocument) -> Result<ReviewId, ReviewStoreError> {
        Ok(ReviewId::new("fixture-review"))
    }
}
