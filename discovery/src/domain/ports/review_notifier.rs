//! Driven port for the "new review posted" side effect.
//!
//! Delivery is best effort: the ledger never waits on it and ignores its
//! failures.

use std::collections::BTreeSet;

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::PlaceId;

/// Notice sent to earlier reviewers of a place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPostedNotice {
    /// Place that received the review.
    pub place_id: PlaceId,
    /// Author ids of earlier reviewers, excluding the submitter.
    pub recipients: BTreeSet<String>,
}

define_port_error! {
    /// Errors raised by notification adapters.
    pub enum ReviewNotifierError {
        /// Delivery failed.
        Delivery { message: String } =>
            "review notification delivery failed: {message}",
    }
}

/// Port delivering review notices.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewNotifier: Send + Sync {
    /// Deliver one notice.
    async fn notify(&self, notice: &ReviewPostedNotice) -> Result<(), ReviewNotifierError>;
}

/// Notifier that drops every notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReviewNotifier;

#[async_trait]
impl ReviewNotifier for NoOpReviewNotifier {
    async fn notify(&self, _notice: &ReviewPostedNotice) -> Result<(), ReviewNotifierError> {
        Ok(())
    }
}
