//! Review entities and the draft a user composes before submitting.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::PlaceId;

use super::ReviewError;

/// Lowest accepted star rating.
pub const MIN_RATING: u8 = 1;
/// Highest accepted star rating.
pub const MAX_RATING: u8 = 5;

/// Backend-assigned review identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(String);

impl ReviewId {
    /// Wrap an identifier issued by the review store.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl AsRef<str> for ReviewId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Star rating in `[1, 5]`, checked when a review is composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Validate a star rating.
    ///
    /// # Examples
    /// ```
    /// use discovery::domain::Rating;
    ///
    /// assert_eq!(Rating::new(4).map(Rating::stars), Ok(4));
    /// assert!(Rating::new(0).is_err());
    /// assert!(Rating::new(6).is_err());
    /// ```
    pub fn new(stars: u8) -> Result<Self, ReviewError> {
        if (MIN_RATING..=MAX_RATING).contains(&stars) {
            Ok(Self(stars))
        } else {
            Err(ReviewError::InvalidRating { value: stars })
        }
    }

    /// Number of stars.
    pub fn stars(self) -> u8 {
        self.0
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self(MAX_RATING)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = ReviewError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Identity of a review's author, for display and notification routing.
///
/// Stored documents carry it as two flat fields, `userId` and `username`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReviewAuthor {
    /// Stable author identifier.
    pub id: String,
    /// Optional display label.
    pub label: Option<String>,
}

impl ReviewAuthor {
    /// Author with an id and no display label.
    pub fn anonymous(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
        }
    }

    fn from_fields(user_id: Option<String>, username: Option<String>) -> Option<Self> {
        user_id.map(|id| Self {
            id,
            label: username,
        })
    }

    fn into_fields(author: Option<Self>) -> (Option<String>, Option<String>) {
        author.map_or((None, None), |author| (Some(author.id), author.label))
    }
}

/// A stored review as read back from the review store.
///
/// `rating` is the raw stored value; it was validated at submission and is not
/// re-checked here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ReviewRecord", into = "ReviewRecord")]
pub struct Review {
    /// Backend-assigned id.
    pub id: ReviewId,
    /// Reviewed place.
    pub place_id: PlaceId,
    /// Stars as stored.
    pub rating: u8,
    /// Review text.
    pub comment: String,
    /// Download URL of the attached photo.
    pub image_url: Option<String>,
    /// Submitting author, when recorded.
    pub author: Option<ReviewAuthor>,
    /// Server timestamp; `None` while the server has not resolved it yet.
    pub created_at: Option<DateTime<Utc>>,
}

/// Document appended to the review store on submission.
///
/// The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NewReviewRecord", into = "NewReviewRecord")]
pub struct NewReviewDocument {
    /// Reviewed place.
    pub place_id: PlaceId,
    /// Validated stars.
    pub rating: Rating,
    /// Non-blank review text.
    pub comment: String,
    /// Download URL of the uploaded photo.
    pub image_url: Option<String>,
    /// Submitting author.
    pub author: Option<ReviewAuthor>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewRecord {
    id: ReviewId,
    place_id: PlaceId,
    rating: u8,
    comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
}

impl From<ReviewRecord> for Review {
    fn from(value: ReviewRecord) -> Self {
        Self {
            id: value.id,
            place_id: value.place_id,
            rating: value.rating,
            comment: value.comment,
            image_url: value.image_url,
            author: ReviewAuthor::from_fields(value.user_id, value.username),
            created_at: value.created_at,
        }
    }
}

impl From<Review> for ReviewRecord {
    fn from(value: Review) -> Self {
        let (user_id, username) = ReviewAuthor::into_fields(value.author);
        Self {
            id: value.id,
            place_id: value.place_id,
            rating: value.rating,
            comment: value.comment,
            image_url: value.image_url,
            user_id,
            username,
            created_at: value.created_at,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewReviewRecord {
    place_id: PlaceId,
    rating: Rating,
    comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
}

impl From<NewReviewRecord> for NewReviewDocument {
    fn from(value: NewReviewRecord) -> Self {
        Self {
            place_id: value.place_id,
            rating: value.rating,
            comment: value.comment,
            image_url: value.image_url,
            author: ReviewAuthor::from_fields(value.user_id, value.username),
        }
    }
}

impl From<NewReviewDocument> for NewReviewRecord {
    fn from(value: NewReviewDocument) -> Self {
        let (user_id, username) = ReviewAuthor::into_fields(value.author);
        Self {
            place_id: value.place_id,
            rating: value.rating,
            comment: value.comment,
            image_url: value.image_url,
            user_id,
            username,
        }
    }
}

/// Opaque handle to a locally picked or captured image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoHandle(String);

impl PhotoHandle {
    /// Wrap a handle returned by the photo picker.
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }
}

impl AsRef<str> for PhotoHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Object-store key for a review photo: `reviews/{placeId}_{timestamp}.jpg`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhotoKey(String);

impl PhotoKey {
    /// Build the key for a photo submitted for `place_id` at `submitted_at`.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use discovery::domain::{PhotoKey, PlaceId};
    ///
    /// let at = Utc.timestamp_millis_opt(1_700_000_000_123).single().expect("valid");
    /// let key = PhotoKey::for_review(&PlaceId::new("node-7").expect("valid"), at);
    /// assert_eq!(key.as_ref(), "reviews/node-7_1700000000123.jpg");
    /// ```
    pub fn for_review(place_id: &PlaceId, submitted_at: DateTime<Utc>) -> Self {
        Self(format!(
            "reviews/{place_id}_{millis}.jpg",
            millis = submitted_at.timestamp_millis()
        ))
    }
}

impl AsRef<str> for PhotoKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhotoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Review being composed by the user.
///
/// Submission borrows the draft, so a failed submission leaves it intact for
/// a retry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReviewDraft {
    /// Selected stars; defaults to five.
    pub rating: Rating,
    /// Review text.
    pub comment: String,
    /// Picked or captured photo.
    pub photo: Option<PhotoHandle>,
    /// Signed-in author, if any; otherwise the ledger's identity provider is
    /// consulted.
    pub author: Option<ReviewAuthor>,
}

impl ReviewDraft {
    /// Draft with the given rating and comment.
    pub fn new(rating: Rating, comment: impl Into<String>) -> Self {
        Self {
            rating,
            comment: comment.into(),
            photo: None,
            author: None,
        }
    }

    /// Attach a photo.
    pub fn with_photo(mut self, photo: PhotoHandle) -> Self {
        self.photo = Some(photo);
        self
    }

    /// Attach an explicit author.
    pub fn with_author(mut self, author: ReviewAuthor) -> Self {
        self.author = Some(author);
        self
    }

    /// Whether the comment has content once trimmed.
    pub fn has_comment(&self) -> bool {
        !self.comment.trim().is_empty()
    }

    /// Reset the composer after a successful submission.
    ///
    /// The author is kept since it belongs to the session, not the review.
    pub fn clear(&mut self) {
        self.rating = Rating::default();
        self.comment.clear();
        self.photo = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(5)]
    fn accepts_ratings_in_range(#[case] stars: u8) {
        assert_eq!(Rating::new(stars).map(Rating::stars), Ok(stars));
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[case(255)]
    fn rejects_ratings_out_of_range(#[case] stars: u8) {
        assert_eq!(
            Rating::new(stars),
            Err(ReviewError::InvalidRating { value: stars })
        );
    }

    #[rstest]
    #[case("", false)]
    #[case("   \n\t", false)]
    #[case(" tasty ", true)]
    fn draft_comment_presence_ignores_whitespace(#[case] comment: &str, #[case] expected: bool) {
        assert_eq!(ReviewDraft::new(Rating::default(), comment).has_comment(), expected);
    }

    #[test]
    fn clearing_a_draft_keeps_the_author() {
        let author = ReviewAuthor::anonymous("u-1");
        let mut draft = ReviewDraft::new(Rating::new(2).expect("valid"), "meh")
            .with_photo(PhotoHandle::new("file:///tmp/a.jpg"))
            .with_author(author.clone());

        draft.clear();

        assert_eq!(draft.rating, Rating::default());
        assert!(draft.comment.is_empty());
        assert!(draft.photo.is_none());
        assert_eq!(draft.author, Some(author));
    }

    #[test]
    fn review_documents_tolerate_missing_optional_fields() {
        let review: Review = serde_json::from_str(
            r#"{"id":"r1","placeId":"node-1","rating":4,"comment":"ok"}"#,
        )
        .expect("minimal review decodes");
        assert!(review.image_url.is_none());
        assert!(review.author.is_none());
        assert!(review.created_at.is_none());
    }

    #[test]
    fn stored_author_fields_are_flat() {
        let review: Review = serde_json::from_str(
            r#"{
                "id": "r2",
                "placeId": "node-1",
                "rating": 5,
                "comment": "hi",
                "userId": "u1",
                "username": "Ann",
                "createdAt": "2026-06-01T09:00:00Z"
            }"#,
        )
        .expect("review decodes");

        assert_eq!(
            review.author,
            Some(ReviewAuthor {
                id: "u1".to_owned(),
                label: Some("Ann".to_owned()),
            })
        );
        assert!(review.created_at.is_some());
        let encoded = serde_json::to_value(&review).expect("review encodes");
        assert_eq!(encoded["userId"], "u1");
        assert_eq!(encoded["username"], "Ann");
        assert!(encoded.get("author").is_none());
    }

    #[test]
    fn username_without_user_id_is_not_an_author() {
        let review: Review = serde_json::from_str(
            r#"{"id":"r3","placeId":"node-1","rating":3,"comment":"ok","username":"Ann"}"#,
        )
        .expect("review decodes");
        assert!(review.author.is_none());
    }

    #[test]
    fn new_documents_encode_the_stored_shape() {
        let document = NewReviewDocument {
            place_id: PlaceId::new("node-1").expect("valid id"),
            rating: Rating::new(5).expect("valid"),
            comment: "hi".to_owned(),
            image_url: None,
            author: Some(ReviewAuthor {
                id: "u1".to_owned(),
                label: Some("Ann".to_owned()),
            }),
        };

        let encoded = serde_json::to_value(&document).expect("document encodes");

        assert_eq!(
            encoded,
            serde_json::json!({
                "placeId": "node-1",
                "rating": 5,
                "comment": "hi",
                "userId": "u1",
                "username": "Ann"
            })
        );
        let decoded: NewReviewDocument =
            serde_json::from_value(encoded).expect("document decodes");
        assert_eq!(decoded, document);
    }

    #[test]
    fn anonymous_documents_omit_author_fields() {
        let document = NewReviewDocument {
            place_id: PlaceId::new("way-2").expect("valid id"),
            rating: Rating::default(),
            comment: "quiet".to_owned(),
            image_url: Some("memory://reviews/way-2_1.jpg".to_owned()),
            author: None,
        };

        let encoded = serde_json::to_value(&document).expect("document encodes");

        assert!(encoded.get("userId").is_none());
        assert!(encoded.get("username").is_none());
        assert_eq!(encoded["imageUrl"], "memory://reviews/way-2_1.jpg");
    }
}
