//! Metric-name to model-id lookup.
//!
//! [`ModelIdConfig`] is a file-backed [`ModelResolver`](crate::services::metric_api::ModelResolver).

mod config;

pub use config::ModelIdConfig;
