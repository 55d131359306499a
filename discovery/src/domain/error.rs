//! Failures of the discovery load pipeline.
//!
//! These errors are reported to the caller of a reload as one aggregate
//! failure. Per-place rating fetch failures never appear here: the aggregator
//! converts them to the "no reviews" fallback.

use thiserror::Error;

use super::ports::{PoiSourceError, PositionError};

/// Reload pipeline failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// Location access was refused; no list can be produced.
    #[error("location permission denied")]
    PermissionDenied,
    /// The position provider failed for a reason other than permission.
    #[error("position unavailable: {message}")]
    PositionUnavailable {
        /// Provider detail.
        message: String,
    },
    /// The POI query failed in transport, status, or decoding.
    #[error("place source unavailable: {message}")]
    SourceUnavailable {
        /// Adapter detail.
        message: String,
    },
}

impl DiscoveryError {
    /// Convenience constructor for [`DiscoveryError::SourceUnavailable`].
    pub fn source_unavailable(message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            message: message.into(),
        }
    }
}

impl From<PositionError> for DiscoveryError {
    fn from(value: PositionError) -> Self {
        match value {
            PositionError::PermissionDenied => Self::PermissionDenied,
            PositionError::Unavailable { message } => Self::PositionUnavailable { message },
        }
    }
}

impl From<PoiSourceError> for DiscoveryError {
    fn from(value: PoiSourceError) -> Self {
        Self::source_unavailable(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn permission_denial_maps_to_permission_denied() {
        assert_eq!(
            DiscoveryError::from(PositionError::permission_denied()),
            DiscoveryError::PermissionDenied
        );
    }

    #[rstest]
    #[case(PoiSourceError::transport("connection reset"))]
    #[case(PoiSourceError::timeout("30s elapsed"))]
    #[case(PoiSourceError::status(502_u16, "bad gateway"))]
    #[case(PoiSourceError::decode("expected value"))]
    #[case(PoiSourceError::invalid_request("radius"))]
    fn every_source_failure_is_source_unavailable(#[case] error: PoiSourceError) {
        let expected_message = error.to_string();
        assert_eq!(
            DiscoveryError::from(error),
            DiscoveryError::SourceUnavailable {
                message: expected_message
            }
        );
    }
}
