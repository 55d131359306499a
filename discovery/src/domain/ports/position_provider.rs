//! Driven port for the device position.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::Coordinates;

define_port_error! {
    /// Reasons a position fix could not be obtained.
    pub enum PositionError {
        /// The user refused location access.
        PermissionDenied => "location permission denied",
        /// The provider failed for another reason.
        Unavailable { message: String } =>
            "position unavailable: {message}",
    }
}

/// Port supplying the user's current position.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PositionProvider: Send + Sync {
    /// Acquire a fresh fix, requesting permission if needed.
    async fn current_position(&self) -> Result<Coordinates, PositionError>;
}
