//! Append-only review ledger.
//!
//! Reads go straight to the review store. Submission is all-or-nothing with
//! respect to the photo: when a photo is attached it is uploaded and resolved
//! before the document is written, and any failure on that path aborts the
//! submission before anything is persisted.

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, info, warn};

use super::{NewReviewDocument, PhotoHandle, PhotoKey, Review, ReviewDraft, ReviewError, ReviewId};
use crate::domain::PlaceId;
use crate::domain::ports::{
    IdentityProvider, PhotoLibrary, PhotoStore, ReviewNotifier, ReviewOrder, ReviewPostedNotice,
    ReviewStore,
};

/// Port bundle required by the ledger.
pub struct ReviewLedgerPorts {
    /// Shared review document store.
    pub store: Arc<dyn ReviewStore>,
    /// Local image reader for picker handles.
    pub photo_library: Arc<dyn PhotoLibrary>,
    /// Blob store for uploaded photos.
    pub photo_store: Arc<dyn PhotoStore>,
    /// Fallback author source when a draft carries none.
    pub identity: Arc<dyn IdentityProvider>,
    /// Best-effort "new review" notifications.
    pub notifier: Arc<dyn ReviewNotifier>,
}

/// Per-place review reads and submissions.
#[derive(Clone)]
pub struct ReviewLedger {
    store: Arc<dyn ReviewStore>,
    photo_library: Arc<dyn PhotoLibrary>,
    photo_store: Arc<dyn PhotoStore>,
    identity: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn ReviewNotifier>,
    clock: Arc<dyn Clock>,
}

impl ReviewLedger {
    /// Build a ledger. `clock` stamps photo keys.
    pub fn new(ports: ReviewLedgerPorts, clock: Arc<dyn Clock>) -> Self {
        let ReviewLedgerPorts {
            store,
            photo_library,
            photo_store,
            identity,
            notifier,
        } = ports;
        Self {
            store,
            photo_library,
            photo_store,
            identity,
            notifier,
            clock,
        }
    }

    /// All reviews for `place_id`, newest first.
    ///
    /// Reviews whose timestamp the store has not resolved yet sort last.
    pub async fn list_reviews(&self, place_id: &PlaceId) -> Result<Vec<Review>, ReviewError> {
        let mut reviews = self
            .store
            .reviews_for_place(place_id, ReviewOrder::NewestFirst)
            .await
            .map_err(|error| ReviewError::ReviewReadFailed {
                message: error.to_string(),
            })?;
        sort_newest_first(&mut reviews);
        debug!(place_id = %place_id, count = reviews.len(), "reviews listed");
        Ok(reviews)
    }

    /// Submit `draft` as a new review of `place_id`.
    ///
    /// The draft is only borrowed; callers clear it once this returns `Ok`.
    /// A blank comment is rejected before any port is called. Other reviewers
    /// of the place are notified on a background task whose outcome is not
    /// awaited.
    pub async fn submit_review(
        &self,
        place_id: &PlaceId,
        draft: &ReviewDraft,
    ) -> Result<ReviewId, ReviewError> {
        if !draft.has_comment() {
            return Err(ReviewError::EmptyComment);
        }

        let image_url = match &draft.photo {
            Some(handle) => Some(self.upload_photo(place_id, handle).await?),
            None => None,
        };

        let author = match &draft.author {
            Some(author) => Some(author.clone()),
            None => self.identity.current_author().await,
        };

        let document = NewReviewDocument {
            place_id: place_id.clone(),
            rating: draft.rating,
            comment: draft.comment.clone(),
            image_url,
            author,
        };
        let review_id =
            self.store
                .append(&document)
                .await
                .map_err(|error| ReviewError::ReviewWriteFailed {
                    message: error.to_string(),
                })?;

        info!(
            place_id = %place_id,
            review_id = %review_id,
            rating = document.rating.stars(),
            has_photo = document.image_url.is_some(),
            "review submitted"
        );

        let submitter = document.author.map(|author| author.id);
        self.spawn_notification(place_id.clone(), submitter);
        Ok(review_id)
    }

    async fn upload_photo(
        &self,
        place_id: &PlaceId,
        handle: &PhotoHandle,
    ) -> Result<String, ReviewError> {
        let bytes = self
            .photo_library
            .load(handle)
            .await
            .map_err(|error| ReviewError::photo_upload_failed(error.to_string()))?;
        let key = PhotoKey::for_review(place_id, self.clock.utc());
        self.photo_store
            .upload(&key, bytes)
            .await
            .map_err(|error| ReviewError::photo_upload_failed(error.to_string()))?;
        let url = self
            .photo_store
            .download_url(&key)
            .await
            .map_err(|error| ReviewError::photo_upload_failed(error.to_string()))?;
        debug!(place_id = %place_id, %key, "review photo uploaded");
        Ok(url)
    }

    fn spawn_notification(&self, place_id: PlaceId, submitter: Option<String>) {
        let store = Arc::clone(&self.store);
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            let reviews = match store
                .reviews_for_place(&place_id, ReviewOrder::Unordered)
                .await
            {
                Ok(reviews) => reviews,
                Err(error) => {
                    warn!(
                        place_id = %place_id,
                        error_kind = error.kind(),
                        %error,
                        "could not resolve reviewers to notify"
                    );
                    return;
                }
            };
            let recipients = recipients_for(&reviews, submitter.as_deref());
            if recipients.is_empty() {
                debug!(place_id = %place_id, "no other reviewers to notify");
                return;
            }
            let notice = ReviewPostedNotice {
                place_id,
                recipients,
            };
            if let Err(error) = notifier.notify(&notice).await {
                warn!(
                    place_id = %notice.place_id,
                    error_kind = error.kind(),
                    %error,
                    "review notification failed"
                );
            }
        });
    }
}

/// Stable sort by `created_at` descending; unresolved timestamps go last.
pub fn sort_newest_first(reviews: &mut [Review]) {
    reviews.sort_by_key(|review| Reverse(review.created_at));
}

/// Distinct author ids of `reviews`, excluding `submitter`.
///
/// # Examples
/// ```
/// use discovery::domain::recipients_for;
///
/// assert!(recipients_for(&[], Some("me")).is_empty());
/// ```
pub fn recipients_for(reviews: &[Review], submitter: Option<&str>) -> BTreeSet<String> {
    reviews
        .iter()
        .filter_map(|review| review.author.as_ref())
        .map(|author| author.id.as_str())
        .filter(|id| Some(*id) != submitter)
        .map(str::to_owned)
        .collect()
}
