//! Capability probe for analytic models.

use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::loaders::error::LoadError;
use crate::services::metric_api::{
    MetricApi, ModelInfo, QueryOptions, QuerySpec, RawSeries, TimeWindow,
};

/// What a model told us about itself.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub dimensions: BTreeSet<String>,
    /// The undimensioned aggregate returned by the probe.
    pub raw_datas: Vec<RawSeries>,
}

impl Discovery {
    pub fn supports(&self, dimension: &str) -> bool {
        self.dimensions.contains(dimension)
    }

    /// First candidate the model supports.
    pub fn first_supported<'a>(&self, candidates: &[&'a str]) -> Option<&'a str> {
        candidates.iter().copied().find(|c| self.supports(c))
    }
}

/// Dimension names advertised by model metadata; blank names are dropped.
pub fn dimension_names(model: &ModelInfo) -> BTreeSet<String> {
    model
        .analysis_dimensions
        .iter()
        .filter_map(|d| d.name())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Issues one undimensioned query with model metadata to learn the
/// supported grouping dimensions.
#[tracing::instrument(skip(api, window), fields(model_id = %model_id))]
pub async fn discover(
    api: &dyn MetricApi,
    model_id: &str,
    window: TimeWindow,
    ignoring_hcts: bool,
) -> Result<Discovery, LoadError> {
    let spec = QuerySpec {
        instant: true,
        window,
        dimensions: Vec::new(),
    };
    let options = QueryOptions {
        include_model: true,
        ignoring_hcts,
    };

    let response = api
        .query_model(model_id, &spec, options)
        .await
        .map_err(|source| LoadError::Discovery {
            model_id: model_id.to_string(),
            source,
        })?;

    let dimensions = response
        .model
        .as_ref()
        .map(dimension_names)
        .unwrap_or_default();
    let raw_datas = response.into_series();

    debug!(?dimensions, "Model dimensions");
    info!(
        dimension_count = dimensions.len(),
        raw_series = raw_datas.len(),
        "Dimension discovery complete"
    );

    Ok(Discovery {
        dimensions,
        raw_datas,
    })
}
