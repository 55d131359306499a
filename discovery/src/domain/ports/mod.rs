//! Driven ports for the discovery core.
//!
//! Every external collaborator (POI service, review store, object store,
//! position, identity, notifications) is reached through one of these traits
//! so the domain stays testable without a UI harness or network.

mod macros;
pub(crate) use macros::define_port_error;

mod identity_provider;
mod photo_store;
mod poi_source;
mod position_provider;
mod review_notifier;
mod review_store;

#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{IdentityProvider, NoIdentity};
#[cfg(test)]
pub use photo_store::{MockPhotoLibrary, MockPhotoStore};
pub use photo_store::{PhotoLibrary, PhotoLibraryError, PhotoStore, PhotoStoreError};
#[cfg(test)]
pub use poi_source::MockPoiSource;
pub use poi_source::{FixturePoiSource, NearbyPoiQuery, PoiSource, PoiSourceError, RawPoiElement};
#[cfg(test)]
pub use position_provider::MockPositionProvider;
pub use position_provider::{PositionError, PositionProvider};
#[cfg(test)]
pub use review_notifier::MockReviewNotifier;
pub use review_notifier::{
    NoOpReviewNotifier, ReviewNotifier, ReviewNotifierError, ReviewPostedNotice,
};
#[cfg(test)]
pub use review_store::MockReviewStore;
pub use review_store::{FixtureReviewStore, ReviewOrder, ReviewStore, ReviewStoreError};
