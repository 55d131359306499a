//! Position provider returning a configured fix.

use async_trait::async_trait;

use crate::domain::Coordinates;
use crate::domain::ports::{PositionError, PositionProvider};

/// Position provider for hosts without a location service.
///
/// `None` behaves like a user who refused location access.
#[derive(Debug, Clone, Copy)]
pub struct FixedPositionProvider {
    position: Option<Coordinates>,
}

impl FixedPositionProvider {
    /// Provider that always reports `position`.
    pub fn new(position: Coordinates) -> Self {
        Self {
            position: Some(position),
        }
    }

    /// Provider that always reports a permission denial.
    pub fn denied() -> Self {
        Self { position: None }
    }
}

#[async_trait]
impl PositionProvider for FixedPositionProvider {
    async fn current_position(&self) -> Result<Coordinates, PositionError> {
        self.position.ok_or_else(PositionError::permission_denied)
    }
}
