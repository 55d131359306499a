//! Nearby restaurant and cafe discovery with shared reviews.
//!
//! - `domain`: place pipeline, catalog, review ledger, and driven ports.
//! - `outbound`: adapters for Overpass, local files, and in-memory stores.
//! - `config`: OrthoConfig-backed settings.

pub mod config;
pub mod domain;
pub mod outbound;
