//! In-process adapters for the review store, photo store, and position.
//!
//! These back the command-line client and integration tests. State lives only
//! as long as the adapter value; nothing is shared across processes.

mod photo_store;
mod position;
mod review_store;

pub use photo_store::InMemoryPhotoStore;
pub use position::FixedPositionProvider;
pub use review_store::InMemoryReviewStore;
