//! Trait and types for interacting with an analytic metric-model backend.

use anyhow::{Context, Result, ensure};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A closed `[start, end]` query window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// The window ending now and reaching `days` back.
    ///
    /// Fails for non-positive spans and for spans that fall outside the
    /// representable date range.
    pub fn last_days(days: i64) -> Result<Self> {
        ensure!(days > 0, "window must span at least one day, got {days}");
        let span = Duration::try_days(days)
            .with_context(|| format!("window of {days} days is out of range"))?;
        let end = Utc::now();
        let start = end
            .checked_sub_signed(span)
            .with_context(|| format!("window of {days} days reaches before the earliest date"))?;
        Ok(Self { start, end })
    }

    pub fn span(&self) -> Duration {
        self.end - self.start
    }
}

/// Body of a single model query.
///
/// An empty `dimensions` list asks for the undimensioned aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuerySpec {
    pub instant: bool,
    #[serde(flatten)]
    pub window: TimeWindow,
    #[serde(rename = "analysis_dimensions", skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<String>,
}

/// Flags sent alongside a query, outside its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Ask the backend to return model metadata (supported dimensions).
    pub include_model: bool,
    pub ignoring_hcts: bool,
}

/// One entry of `analysisDimensions`: either a bare name or a descriptor object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DimensionDescriptor {
    Name(String),
    Named { name: String },
    Other(Value),
}

impl DimensionDescriptor {
    pub fn name(&self) -> Option<&str> {
        match self {
            DimensionDescriptor::Name(name) | DimensionDescriptor::Named { name } => {
                Some(name.as_str())
            }
            DimensionDescriptor::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    #[serde(default)]
    pub analysis_dimensions: Vec<DimensionDescriptor>,
}

/// One labeled series as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    #[serde(default)]
    pub labels: HashMap<String, Value>,
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub model: Option<ModelInfo>,
    #[serde(default)]
    pub datas: Option<Vec<RawSeries>>,
}

impl QueryResponse {
    /// Consumes the response, returning its series (empty when absent).
    pub fn into_series(self) -> Vec<RawSeries> {
        self.datas.unwrap_or_default()
    }
}

/// Abstraction over the analytic metric backend.
#[async_trait::async_trait]
pub trait MetricApi: Send + Sync {
    /// Runs one query against `model_id`. Rejects on transport or backend
    /// faults, including unsupported dimension names.
    async fn query_model(
        &self,
        model_id: &str,
        spec: &QuerySpec,
        options: QueryOptions,
    ) -> Result<QueryResponse>;
}

/// Resolves a human-readable metric name into a backend model id.
#[async_trait::async_trait]
pub trait ModelResolver: Send + Sync {
    async fn resolve(&self, metric_name: &str) -> Result<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_descriptor_accepts_both_forms() {
        let json = r#"{"analysisDimensions": ["supplier_code", {"name": "supplier_name"}, 42]}"#;
        let model: ModelInfo = serde_json::from_str(json).unwrap();
        let names: Vec<_> = model
            .analysis_dimensions
            .iter()
            .filter_map(|d| d.name())
            .collect();

        assert_eq!(names, vec!["supplier_code", "supplier_name"]);
    }

    #[test]
    fn test_last_days_spans_requested_days() {
        let window = TimeWindow::last_days(365).unwrap();

        assert!(window.start < window.end);
        assert_eq!(window.span().num_days(), 365);
    }

    #[test]
    fn test_last_days_rejects_out_of_range_spans() {
        assert!(TimeWindow::last_days(0).is_err());
        assert!(TimeWindow::last_days(-365).is_err());
        assert!(TimeWindow::last_days(1_000_000_000).is_err());
        assert!(TimeWindow::last_days(i64::MAX).is_err());
    }

    #[test]
    fn test_query_spec_wire_shape() {
        let spec = QuerySpec {
            instant: true,
            window: TimeWindow {
                start: DateTime::from_timestamp_millis(1_000).unwrap(),
                end: DateTime::from_timestamp_millis(2_000).unwrap(),
            },
            dimensions: vec![],
        };
        let value = serde_json::to_value(&spec).unwrap();

        assert_eq!(value["start"], 1_000);
        assert_eq!(value["end"], 2_000);
        assert!(value.get("analysis_dimensions").is_none());
    }

    #[test]
    fn test_missing_datas_yields_empty_series() {
        let response: QueryResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_series().is_empty());
    }
}
