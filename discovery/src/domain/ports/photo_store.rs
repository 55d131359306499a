//! Driven ports for review photos: reading the local image behind a picker
//! handle, and storing it in the shared object store.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{PhotoHandle, PhotoKey};

define_port_error! {
    /// Errors raised while reading a locally picked photo.
    pub enum PhotoLibraryError {
        /// The handle does not resolve to a readable image.
        NotFound { handle: String } =>
            "photo {handle} not found",
        /// Reading the image failed.
        Read { message: String } =>
            "photo read failed: {message}",
    }
}

/// Port resolving picker handles to image bytes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoLibrary: Send + Sync {
    /// Load the image referenced by `handle`.
    async fn load(&self, handle: &PhotoHandle) -> Result<Vec<u8>, PhotoLibraryError>;
}

define_port_error! {
    /// Errors raised by object store adapters.
    pub enum PhotoStoreError {
        /// Uploading the blob failed.
        Upload { message: String } =>
            "photo upload failed: {message}",
        /// The stored blob has no resolvable download URL.
        Resolve { message: String } =>
            "photo url resolution failed: {message}",
    }
}

/// Port for the blob store holding review photos.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Write `bytes` at `key`, replacing any existing blob.
    async fn upload(&self, key: &PhotoKey, bytes: Vec<u8>) -> Result<(), PhotoStoreError>;

    /// Durable fetch URL for the blob at `key`.
    async fn download_url(&self, key: &PhotoKey) -> Result<String, PhotoStoreError>;
}
