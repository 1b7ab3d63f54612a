//! Degrading query ladder.
//!
//! Backend models differ in which dimension combinations they accept and in
//! how much history they keep. The planner tries the richest grouping first
//! and sheds dimensions until some tier returns data, retrying each tier
//! against a long window before giving it up.

use tracing::{debug, info, warn};

use crate::loaders::discovery::Discovery;
use crate::loaders::error::LoadError;
use crate::loaders::profile::EntityProfile;
use crate::loaders::types::{Grouping, MetricDataset};
use crate::services::metric_api::{MetricApi, QueryOptions, QuerySpec, RawSeries, TimeWindow};

/// Dimensions picked from a discovery, by role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionPlan {
    pub code: String,
    pub name: Option<String>,
    pub amount: Option<String>,
}

impl DimensionPlan {
    /// Picks the preferred code, name and amount dimensions the model supports.
    /// Returns `None` when no code dimension is available.
    pub fn from_discovery(discovery: &Discovery, profile: &EntityProfile) -> Option<Self> {
        let code = discovery.first_supported(profile.code_dimensions)?;
        Some(Self {
            code: code.to_string(),
            name: discovery
                .first_supported(profile.name_dimensions)
                .map(str::to_string),
            amount: discovery
                .first_supported(profile.amount_dimensions)
                .map(str::to_string),
        })
    }

    fn full(&self) -> Vec<String> {
        std::iter::once(&self.code)
            .chain(self.name.iter())
            .chain(self.amount.iter())
            .cloned()
            .collect()
    }

    fn code_and_name(&self) -> Vec<String> {
        std::iter::once(&self.code)
            .chain(self.name.iter())
            .cloned()
            .collect()
    }
}

/// One rung of the ladder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTier {
    pub label: &'static str,
    pub dimensions: Vec<String>,
}

/// Ordered tiers for a plan: full, code + name (only when full has more than
/// two dimensions), then code only. A tier identical to an earlier one is
/// not repeated.
pub fn plan_tiers(plan: &DimensionPlan) -> Vec<QueryTier> {
    let full = plan.full();
    let mut candidates = vec![QueryTier {
        label: "full",
        dimensions: full.clone(),
    }];
    if full.len() > 2 {
        candidates.push(QueryTier {
            label: "code_and_name",
            dimensions: plan.code_and_name(),
        });
    }
    candidates.push(QueryTier {
        label: "code_only",
        dimensions: vec![plan.code.clone()],
    });

    let mut tiers: Vec<QueryTier> = Vec::with_capacity(candidates.len());
    for tier in candidates {
        if !tiers.iter().any(|t| t.dimensions == tier.dimensions) {
            tiers.push(tier);
        }
    }
    tiers
}

/// The short and long windows tried for every tier, in that order.
#[derive(Debug, Clone, Copy)]
pub struct QueryWindows {
    pub short_days: i64,
    pub long_days: i64,
}

impl QueryWindows {
    /// Both windows, ending now.
    pub fn windows(&self) -> Result<[TimeWindow; 2], LoadError> {
        let short = TimeWindow::last_days(self.short_days).map_err(LoadError::Window)?;
        let long = TimeWindow::last_days(self.long_days).map_err(LoadError::Window)?;
        Ok([short, long])
    }
}

/// Runs a single dimension/window attempt.
pub async fn run_tier(
    api: &dyn MetricApi,
    model_id: &str,
    dimensions: &[String],
    window: TimeWindow,
    ignoring_hcts: bool,
) -> Result<Vec<RawSeries>, LoadError> {
    let spec = QuerySpec {
        instant: true,
        window,
        dimensions: dimensions.to_vec(),
    };
    let options = QueryOptions {
        include_model: false,
        ignoring_hcts,
    };

    api.query_model(model_id, &spec, options)
        .await
        .map(|response| response.into_series())
        .map_err(|source| LoadError::Query {
            model_id: model_id.to_string(),
            dimensions: dimensions.to_vec(),
            source,
        })
}

/// Walks the ladder for `model_id` and returns the first non-empty result.
///
/// Tier failures are logged and treated as empty. When the model has no code
/// dimension, or every tier comes back empty, the discovery's undimensioned
/// result is returned as an [`Grouping::Aggregate`] dataset.
#[tracing::instrument(skip_all, fields(model_id = %model_id, kind = profile.kind))]
pub async fn plan_and_execute(
    api: &dyn MetricApi,
    model_id: &str,
    discovery: Discovery,
    profile: &EntityProfile,
    windows: QueryWindows,
    discovery_window: TimeWindow,
    ignoring_hcts: bool,
) -> MetricDataset {
    let Some(plan) = DimensionPlan::from_discovery(&discovery, profile) else {
        warn!(
            dimensions = ?discovery.dimensions,
            "No code dimension supported, returning undimensioned result"
        );
        return MetricDataset::aggregate(model_id, discovery_window, discovery.raw_datas);
    };

    let tiers = plan_tiers(&plan);
    info!(?plan, tiers = tiers.len(), "Query plan ready");

    let windows = match windows.windows() {
        Ok(windows) => windows,
        Err(e) => {
            warn!(error = %e, "No usable query window, returning undimensioned result");
            return MetricDataset::aggregate(model_id, discovery_window, discovery.raw_datas);
        }
    };

    for tier in &tiers {
        for window in windows {
            debug!(
                tier = tier.label,
                dimensions = ?tier.dimensions,
                window_days = window.span().num_days(),
                "Trying tier"
            );

            match run_tier(api, model_id, &tier.dimensions, window, ignoring_hcts).await {
                Ok(series) if !series.is_empty() => {
                    info!(
                        tier = tier.label,
                        series = series.len(),
                        window_days = window.span().num_days(),
                        "Tier returned data"
                    );
                    return MetricDataset {
                        model_id: Some(model_id.to_string()),
                        dimensions: tier.dimensions.clone(),
                        window: Some(window),
                        grouping: Grouping::ByEntity,
                        series,
                    };
                }
                Ok(_) => debug!(tier = tier.label, "Tier returned no series"),
                Err(e) => warn!(tier = tier.label, error = %e, "Tier query failed"),
            }
        }
    }

    warn!(
        raw_series = discovery.raw_datas.len(),
        "All tiers exhausted, falling back to undimensioned result"
    );
    MetricDataset::aggregate(model_id, discovery_window, discovery.raw_datas)
}
