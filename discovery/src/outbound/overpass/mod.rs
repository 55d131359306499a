//! Overpass outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `PoiSource` port
//! against an Overpass API interpreter endpoint.

mod dto;
mod http_source;

pub use http_source::{OverpassHttpIdentity, OverpassHttpSource};
