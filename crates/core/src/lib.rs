//! riskycomb-core
//!
//! Core library for finding risky argument combinations in logged calls to
//! numpy, pandas and matplotlib.
//!
//! A call line goes through the extractor and safety filter (`call`), is
//! evaluated in an isolated interpreter process (`services::evaluator`), and,
//! when it runs, is bound against the target function's parameter table
//! (`registry`) and classified by that function's rule set (`classify`).
//! Findings are appended to plain-text logs by the report sink (`report`).
//!
//! All decision logic lives here so frontends stay thin.

pub mod call;
pub mod classify;
pub mod config;
pub mod model;
pub mod registry;
pub mod report;
pub mod services;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
