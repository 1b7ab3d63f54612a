//! Data types shared by the loading pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::loaders::grade::Grade;
use crate::loaders::risk::RiskLevel;
use crate::services::metric_api::{RawSeries, TimeWindow};

/// How the series of a dataset are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    /// One series per entity code.
    ByEntity,
    /// The undimensioned aggregate of the whole model.
    Aggregate,
}

/// The outcome of one load cycle, as held in the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDataset {
    pub model_id: Option<String>,
    /// Dimensions of the query that produced `series`; empty for the aggregate.
    pub dimensions: Vec<String>,
    pub window: Option<TimeWindow>,
    pub grouping: Grouping,
    pub series: Vec<RawSeries>,
}

impl MetricDataset {
    /// A dataset with no series, used when discovery could not run.
    pub fn empty() -> Self {
        Self {
            model_id: None,
            dimensions: Vec::new(),
            window: None,
            grouping: Grouping::Aggregate,
            series: Vec::new(),
        }
    }

    /// The undimensioned result of the capability probe.
    pub fn aggregate(model_id: &str, window: TimeWindow, series: Vec<RawSeries>) -> Self {
        Self {
            model_id: Some(model_id.to_string()),
            dimensions: Vec::new(),
            window: Some(window),
            grouping: Grouping::Aggregate,
            series,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Running totals for one entity within a single aggregation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedEntity {
    pub code: String,
    pub name: String,
    pub total_amount: f64,
    pub record_count: usize,
    /// Labels of the last series that contributed to this entity.
    #[serde(skip_serializing)]
    pub labels: HashMap<String, Value>,
}

impl AggregatedEntity {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            total_amount: 0.0,
            record_count: 0,
            labels: HashMap::new(),
        }
    }
}

/// Risk portion of a [`Scorecard`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    /// 0..=100, higher is worse.
    pub rating: f64,
    pub factors: Vec<String>,
    pub assessed_at: DateTime<Utc>,
}

/// Composite per-entity view, rebuilt on every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scorecard {
    pub code: String,
    pub name: String,
    pub total_amount: f64,
    pub record_count: usize,
    pub quality_score: f64,
    pub on_time_delivery_rate: f64,
    pub responsiveness_score: f64,
    pub risk_rating: f64,
    pub overall_score: f64,
    pub overall_grade: Grade,
    pub risk: RiskAssessment,
}
