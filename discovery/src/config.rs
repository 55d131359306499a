//! Discovery client configuration loaded via OrthoConfig.
//!
//! Values come from `DISCOVERY_*` environment variables, an optional
//! configuration file, and command-line flags, in OrthoConfig's usual
//! precedence. The search radius carries an OrthoConfig default; the other
//! fields are optional and their accessors apply the defaults.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{PlaceCatalogConfig, RatingAggregatorConfig, SearchRadius};
use crate::outbound::overpass::OverpassHttpIdentity;

/// Public Overpass interpreter used when no endpoint is configured.
pub const DEFAULT_OVERPASS_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_RATING_QUERY_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_MAX_CONCURRENT_RATING_QUERIES: usize = 8;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The configured Overpass endpoint is not a valid URL.
    #[error("invalid overpass endpoint '{value}': {source}")]
    InvalidEndpoint {
        /// Raw configured value.
        value: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
}

/// Configuration values for the discovery client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DISCOVERY")]
pub struct DiscoverySettings {
    /// Overpass interpreter URL.
    pub overpass_endpoint: Option<String>,
    /// Search radius in metres.
    #[ortho_config(default = 10_000)]
    pub search_radius_meters: u32,
    /// HTTP timeout for one Overpass request.
    pub request_timeout_seconds: Option<u64>,
    /// User-agent sent to the Overpass endpoint.
    pub overpass_user_agent: Option<String>,
    /// `[timeout:N]` directive embedded in Overpass queries.
    pub overpass_query_timeout_seconds: Option<u32>,
    /// Timeout for one per-place review query.
    pub rating_query_timeout_seconds: Option<u64>,
    /// Maximum review queries in flight during rating aggregation.
    pub max_concurrent_rating_queries: Option<usize>,
    /// Directory holding the persisted device identity.
    pub identity_dir: Option<PathBuf>,
}

impl DiscoverySettings {
    /// Overpass endpoint, falling back to the public interpreter.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidEndpoint`] when the configured value
    /// does not parse as a URL.
    pub fn overpass_endpoint(&self) -> Result<Url, SettingsError> {
        let raw = self
            .overpass_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_OVERPASS_ENDPOINT);
        Url::parse(raw).map_err(|source| SettingsError::InvalidEndpoint {
            value: raw.to_owned(),
            source,
        })
    }

    /// Configured search radius.
    pub fn search_radius(&self) -> SearchRadius {
        SearchRadius::from_meters(self.search_radius_meters)
    }

    /// Overpass HTTP timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_seconds
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS)
                .max(1),
        )
    }

    /// Overpass request identity, with adapter defaults for unset fields.
    pub fn overpass_identity(&self) -> OverpassHttpIdentity {
        let defaults = OverpassHttpIdentity::default();
        OverpassHttpIdentity {
            user_agent: self
                .overpass_user_agent
                .clone()
                .unwrap_or(defaults.user_agent),
            query_timeout_seconds: self
                .overpass_query_timeout_seconds
                .unwrap_or(defaults.query_timeout_seconds),
        }
    }

    /// Per-place review query timeout.
    pub fn rating_query_timeout(&self) -> Duration {
        Duration::from_secs(
            self.rating_query_timeout_seconds
                .unwrap_or(DEFAULT_RATING_QUERY_TIMEOUT_SECONDS)
                .max(1),
        )
    }

    /// Rating fan-out width; at least one.
    pub fn max_concurrent_rating_queries(&self) -> usize {
        self.max_concurrent_rating_queries
            .unwrap_or(DEFAULT_MAX_CONCURRENT_RATING_QUERIES)
            .max(1)
    }

    /// Identity directory, defaulting to the working directory.
    pub fn identity_dir(&self) -> PathBuf {
        self.identity_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Catalog configuration derived from these settings.
    pub fn catalog_config(&self) -> PlaceCatalogConfig {
        PlaceCatalogConfig {
            radius: self.search_radius(),
            ratings: RatingAggregatorConfig {
                max_concurrent_queries: self.max_concurrent_rating_queries(),
                query_timeout: self.rating_query_timeout(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for discovery configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use crate::domain::DEFAULT_SEARCH_RADIUS_METERS;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "DISCOVERY_OVERPASS_ENDPOINT",
        "DISCOVERY_SEARCH_RADIUS_METERS",
        "DISCOVERY_REQUEST_TIMEOUT_SECONDS",
        "DISCOVERY_OVERPASS_USER_AGENT",
        "DISCOVERY_OVERPASS_QUERY_TIMEOUT_SECONDS",
        "DISCOVERY_RATING_QUERY_TIMEOUT_SECONDS",
        "DISCOVERY_MAX_CONCURRENT_RATING_QUERIES",
        "DISCOVERY_IDENTITY_DIR",
    ];

    fn unset() -> DiscoverySettings {
        DiscoverySettings {
            overpass_endpoint: None,
            search_radius_meters: DEFAULT_SEARCH_RADIUS_METERS,
            request_timeout_seconds: None,
            overpass_user_agent: None,
            overpass_query_timeout_seconds: None,
            rating_query_timeout_seconds: None,
            max_concurrent_rating_queries: None,
            identity_dir: None,
        }
    }

    fn load_from_empty_args() -> DiscoverySettings {
        DiscoverySettings::load_from_iter([OsString::from("discover")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.overpass_endpoint().expect("default parses").as_str(),
            DEFAULT_OVERPASS_ENDPOINT
        );
        assert_eq!(settings.search_radius_meters, DEFAULT_SEARCH_RADIUS_METERS);
        assert_eq!(settings.search_radius().meters(), 10_000);
        assert!(settings.overpass_endpoint.is_none());
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert_eq!(settings.rating_query_timeout(), Duration::from_secs(10));
        assert_eq!(settings.max_concurrent_rating_queries(), 8);
        assert_eq!(settings.identity_dir(), PathBuf::from("."));
        assert_eq!(settings.overpass_identity(), OverpassHttpIdentity::default());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "DISCOVERY_OVERPASS_ENDPOINT",
                Some("http://localhost:12345/api/interpreter".to_owned()),
            ),
            ("DISCOVERY_SEARCH_RADIUS_METERS", Some("2500".to_owned())),
            ("DISCOVERY_REQUEST_TIMEOUT_SECONDS", Some("5".to_owned())),
            ("DISCOVERY_RATING_QUERY_TIMEOUT_SECONDS", Some("2".to_owned())),
            ("DISCOVERY_MAX_CONCURRENT_RATING_QUERIES", Some("3".to_owned())),
            ("DISCOVERY_IDENTITY_DIR", Some("/tmp/discovery".to_owned())),
            ("DISCOVERY_OVERPASS_USER_AGENT", Some("cafe-finder/2.0".to_owned())),
            ("DISCOVERY_OVERPASS_QUERY_TIMEOUT_SECONDS", Some("40".to_owned())),
        ]);

        let settings = load_from_empty_args();
        let catalog = settings.catalog_config();

        assert_eq!(
            settings.overpass_endpoint().expect("valid url").port(),
            Some(12345)
        );
        assert_eq!(catalog.radius.meters(), 2500);
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
        assert_eq!(catalog.ratings.query_timeout, Duration::from_secs(2));
        assert_eq!(catalog.ratings.max_concurrent_queries, 3);
        assert_eq!(settings.identity_dir(), PathBuf::from("/tmp/discovery"));
        assert_eq!(
            settings.overpass_identity(),
            OverpassHttpIdentity {
                user_agent: "cafe-finder/2.0".to_owned(),
                query_timeout_seconds: 40,
            }
        );
    }

    #[rstest]
    #[case(Some(0), 1)]
    #[case(Some(16), 16)]
    #[case(None, 8)]
    fn fan_out_width_is_at_least_one(#[case] configured: Option<usize>, #[case] expected: usize) {
        let settings = DiscoverySettings {
            max_concurrent_rating_queries: configured,
            ..unset()
        };
        assert_eq!(settings.max_concurrent_rating_queries(), expected);
    }

    #[test]
    fn malformed_endpoint_is_rejected() {
        let settings = DiscoverySettings {
            overpass_endpoint: Some("not a url".to_owned()),
            ..unset()
        };
        assert!(matches!(
            settings.overpass_endpoint(),
            Err(SettingsError::InvalidEndpoint { .. })
        ));
    }
}
