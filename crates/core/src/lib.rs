//! symgraph-core
//!
//! Core library that turns raw symbol metadata exported by a binary-analysis
//! tool into a normalized model: functions with owner scopes and aligned
//! argument lists, classified local types, and a validated relation graph
//! between them.
//!
//! All substantive logic lives here so it is testable and reusable from
//! multiple frontends; the CLI crate is a thin wrapper.

pub mod analysis;
pub mod db;
pub mod model;
pub mod services;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
