//! Reqwest-backed Overpass POI source adapter.
//!
//! This adapter owns transport details only: query text, timeout and HTTP
//! error mapping, and JSON decoding into raw domain elements.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Request, StatusCode, Url};
use tracing::debug;

use super::dto::OverpassResponseDto;
use crate::domain::ports::{NearbyPoiQuery, PoiSource, PoiSourceError, RawPoiElement};

const DEFAULT_OVERPASS_QUERY_TIMEOUT_SECONDS: u32 = 25;
const DEFAULT_USER_AGENT: &str = "discovery-overpass-client/0.1";

/// Outbound identity and query timeout settings for Overpass requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverpassHttpIdentity {
    /// HTTP user-agent sent to Overpass.
    pub user_agent: String,
    /// Timeout directive embedded in Overpass query text.
    pub query_timeout_seconds: u32,
}

impl Default for OverpassHttpIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            query_timeout_seconds: DEFAULT_OVERPASS_QUERY_TIMEOUT_SECONDS,
        }
    }
}

/// POI source that performs HTTP POST requests against one Overpass endpoint.
pub struct OverpassHttpSource {
    client: Client,
    endpoint: Url,
    user_agent: String,
    query_timeout_seconds: u32,
}

impl OverpassHttpSource {
    /// Build an adapter with a client-side request timeout, outbound identity,
    /// and Overpass query timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        timeout: Duration,
        identity: OverpassHttpIdentity,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            user_agent: identity.user_agent,
            query_timeout_seconds: identity.query_timeout_seconds.max(1),
        })
    }
}

#[async_trait]
impl PoiSource for OverpassHttpSource {
    async fn fetch_elements(
        &self,
        query: &NearbyPoiQuery,
    ) -> Result<Vec<RawPoiElement>, PoiSourceError> {
        let query_text = build_overpass_query(query, self.query_timeout_seconds)?;
        let request = self
            .build_request(query_text)
            .map_err(|error| PoiSourceError::invalid_request(error.to_string()))?;
        let response = self
            .client
            .execute(request)
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let elements = parse_elements(body.as_ref())?;
        debug!(
            endpoint = %self.endpoint,
            transfer_bytes = body.len(),
            element_count = elements.len(),
            "overpass query completed"
        );
        Ok(elements)
    }
}

impl OverpassHttpSource {
    /// The query travels form-encoded in the `data` field.
    fn build_request(&self, query_text: String) -> Result<Request, reqwest::Error> {
        self.client
            .post(self.endpoint.clone())
            .header(USER_AGENT, self.user_agent.as_str())
            .header(ACCEPT, "application/json")
            .form(&[("data", query_text)])
            .build()
    }
}

fn parse_elements(body: &[u8]) -> Result<Vec<RawPoiElement>, PoiSourceError> {
    let decoded: OverpassResponseDto = serde_json::from_slice(body).map_err(|error| {
        PoiSourceError::decode(format!("invalid Overpass JSON payload: {error}"))
    })?;
    Ok(decoded.into_raw_elements())
}

fn build_overpass_query(
    query: &NearbyPoiQuery,
    query_timeout_seconds: u32,
) -> Result<String, PoiSourceError> {
    if query.categories.is_empty() {
        return Err(PoiSourceError::invalid_request(
            "query must select at least one category",
        ));
    }
    let around = format!(
        "(around:{radius},{lat},{lon})",
        radius = query.radius.meters(),
        lat = query.center.latitude(),
        lon = query.center.longitude(),
    );

    let mut lines = Vec::with_capacity(query.categories.len() * 2);
    for category in &query.categories {
        let selector = format!("[\"amenity\"=\"{}\"]", category.amenity_tag());
        for element_type in ["node", "way"] {
            lines.push(format!("  {element_type}{selector}{around};"));
        }
    }

    Ok(format!(
        "[out:json][timeout:{query_timeout_seconds}];\n(\n{query_lines}\n);\nout center tags;",
        query_lines = lines.join("\n")
    ))
}

fn map_transport_error(error: reqwest::Error) -> PoiSourceError {
    if error.is_timeout() {
        PoiSourceError::timeout(error.to_string())
    } else if error.is_decode() {
        PoiSourceError::decode(error.to_string())
    } else {
        PoiSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PoiSourceError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_owned()
    } else {
        body_preview
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            PoiSourceError::timeout(format!("status {}: {message}", status.as_u16()))
        }
        _ => PoiSourceError::status(status.as_u16(), message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network Overpass mapping helpers.

    use super::*;
    use crate::domain::{Coordinates, PlaceCategory, SearchRadius};
    use reqwest::header::CONTENT_TYPE;
    use rstest::rstest;

    fn query() -> NearbyPoiQuery {
        NearbyPoiQuery::eateries(
            Coordinates::new(60.1699, 24.9384).expect("valid"),
            SearchRadius::from_meters(10_000),
        )
    }

    #[test]
    fn builds_radius_query_for_nodes_and_ways() {
        let text = build_overpass_query(&query(), 25).expect("query should build");

        assert!(text.starts_with("[out:json][timeout:25];"));
        for line in [
            "node[\"amenity\"=\"restaurant\"](around:10000,60.1699,24.9384);",
            "way[\"amenity\"=\"restaurant\"](around:10000,60.1699,24.9384);",
            "node[\"amenity\"=\"cafe\"](around:10000,60.1699,24.9384);",
            "way[\"amenity\"=\"cafe\"](around:10000,60.1699,24.9384);",
        ] {
            assert!(text.contains(line), "query should contain {line}");
        }
        assert!(text.ends_with("out center tags;"));
    }

    #[test]
    fn single_category_query_selects_only_that_amenity() {
        let mut query = query();
        query.categories = vec![PlaceCategory::Cafe];

        let text = build_overpass_query(&query, 25).expect("query should build");

        assert!(!text.contains("restaurant"));
        assert!(text.contains("cafe"));
    }

    #[test]
    fn rejects_query_without_categories() {
        let mut query = query();
        query.categories.clear();

        let error = build_overpass_query(&query, 25).expect_err("must fail");
        assert!(matches!(error, PoiSourceError::InvalidRequest { .. }));
    }

    #[rstest]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT, true)]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, true)]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, false)]
    #[case::bad_request(StatusCode::BAD_REQUEST, false)]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, false)]
    fn maps_http_statuses(#[case] status: StatusCode, #[case] is_timeout: bool) {
        let error = map_status_error(status, b"{\"remark\":\"runtime error\"}");
        if is_timeout {
            assert!(matches!(error, PoiSourceError::Timeout { .. }));
        } else {
            assert_eq!(
                error,
                PoiSourceError::status(status.as_u16(), "{\"remark\":\"runtime error\"}")
            );
        }
    }

    #[test]
    fn empty_error_body_falls_back_to_reason_phrase() {
        let error = map_status_error(StatusCode::SERVICE_UNAVAILABLE, b"  ");
        assert_eq!(error, PoiSourceError::status(503_u16, "Service Unavailable"));
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn parses_points_and_centroids() {
        let body = r#"{
            "elements": [
                {
                    "type": "node",
                    "id": 101,
                    "lat": 60.17,
                    "lon": 24.94,
                    "tags": { "amenity": "cafe", "name": "Sopo" }
                },
                {
                    "type": "way",
                    "id": 102,
                    "center": { "lat": 60.18, "lon": 24.95 },
                    "tags": { "amenity": "restaurant" }
                },
                { "type": "way", "id": 103, "tags": { "name": "no centre" } },
                { "type": "node", "id": 104, "lat": 95.0, "lon": 24.9 }
            ]
        }"#;

        let elements = parse_elements(body.as_bytes()).expect("JSON should decode");

        assert_eq!(elements.len(), 4);
        assert_eq!(elements[0].element_type.as_deref(), Some("node"));
        assert_eq!(elements[0].tag("name"), Some("Sopo"));
        assert_eq!(
            elements[1].coordinates,
            Some(Coordinates::new(60.18, 24.95).expect("valid"))
        );
        assert!(elements[2].coordinates.is_none());
        assert!(elements[3].coordinates.is_none(), "invalid latitude is dropped");
        assert!(elements[3].tags.is_empty());
    }

    #[test]
    fn request_carries_identity_and_form_encoded_query() {
        let source = OverpassHttpSource::new(
            Url::parse("http://overpass.test/api/interpreter").expect("valid url"),
            Duration::from_secs(5),
            OverpassHttpIdentity {
                user_agent: "discovery-test/1.0".to_owned(),
                query_timeout_seconds: 12,
            },
        )
        .expect("client builds");
        let query_text =
            build_overpass_query(&query(), source.query_timeout_seconds).expect("query builds");

        let request = source.build_request(query_text).expect("request builds");

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.headers()[USER_AGENT], "discovery-test/1.0");
        assert_eq!(
            request.headers()[CONTENT_TYPE],
            "application/x-www-form-urlencoded"
        );
        let body = request
            .body()
            .and_then(reqwest::Body::as_bytes)
            .expect("buffered body");
        let body = String::from_utf8_lossy(body);
        assert!(body.starts_with("data=%5Bout%3Ajson%5D%5Btimeout%3A12%5D"), "body: {body}");
    }

    #[test]
    fn query_timeout_is_at_least_one_second() {
        let source = OverpassHttpSource::new(
            Url::parse("http://overpass.test/").expect("valid url"),
            Duration::from_secs(5),
            OverpassHttpIdentity {
                query_timeout_seconds: 0,
                ..OverpassHttpIdentity::default()
            },
        )
        .expect("client builds");
        assert_eq!(source.query_timeout_seconds, 1);
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        let error = parse_elements(b"<html>busy</html>").expect_err("must fail");
        assert!(matches!(error, PoiSourceError::Decode { .. }));
    }
}
