//! Outbound adapters implementing the domain's driven ports.
//!
//! - **overpass**: reqwest-backed POI source
//! - **memory**: in-process review store, photo store, and fixed position
//! - **photos**: capability-scoped local photo library
//! - **identity**: file-backed anonymous device identity
//! - **notifications**: structured-log review notifier
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod identity;
pub mod memory;
pub mod notifications;
pub mod overpass;
pub mod photos;
