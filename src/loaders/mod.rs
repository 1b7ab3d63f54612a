//! Metric loading for entity views.
//!
//! A load cycle resolves the model id for an entity profile, discovers which
//! grouping dimensions the model supports, walks a degrading ladder of
//! dimension/time-window queries until one returns data, and caches the result
//! behind a single in-flight slot. Consumers fold the cached series into
//! per-entity aggregates and scorecards.

pub mod aggregate;
pub mod coalescer;
pub mod discovery;
pub mod error;
pub mod grade;
pub mod labels;
pub mod loader;
pub mod planner;
pub mod profile;
pub mod risk;
pub mod scorecard;
pub mod types;
