//! Reviews: the stored entities, the user's draft, and the append-only ledger
//! that reads and writes them through the review store.

use thiserror::Error;

mod ledger;
mod model;

pub use ledger::{ReviewLedger, ReviewLedgerPorts, recipients_for, sort_newest_first};
pub use model::{
    MAX_RATING, MIN_RATING, NewReviewDocument, PhotoHandle, PhotoKey, Rating, Review,
    ReviewAuthor, ReviewDraft, ReviewId,
};

/// Review listing and submission failures.
///
/// Every submission failure leaves the caller's draft untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    /// The comment is blank after trimming; nothing was sent.
    #[error("a review needs a comment")]
    EmptyComment,
    /// The star rating is outside `[1, 5]`.
    #[error("rating {value} is outside 1..=5")]
    InvalidRating {
        /// Rejected value.
        value: u8,
    },
    /// The attached photo could not be read, stored, or resolved; the review
    /// was not written.
    #[error("photo upload failed: {message}")]
    PhotoUploadFailed {
        /// Adapter detail.
        message: String,
    },
    /// The review document could not be persisted.
    #[error("review could not be saved: {message}")]
    ReviewWriteFailed {
        /// Adapter detail.
        message: String,
    },
    /// Reviews for a place could not be listed.
    #[error("reviews could not be loaded: {message}")]
    ReviewReadFailed {
        /// Adapter detail.
        message: String,
    },
}

impl ReviewError {
    /// Convenience constructor for [`ReviewError::PhotoUploadFailed`].
    pub fn photo_upload_failed(message: impl Into<String>) -> Self {
        Self::PhotoUploadFailed {
            message: message.into(),
        }
    }
}
