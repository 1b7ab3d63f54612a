use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::LoaderSettings;
use crate::loaders::aggregate::{aggregate, aggregate_all, ranked};
use crate::loaders::coalescer::{Coalescer, DatasetSource, LoadResult};
use crate::loaders::discovery::discover;
use crate::loaders::error::LoadError;
use crate::loaders::planner::{QueryWindows, plan_and_execute};
use crate::loaders::profile::EntityProfile;
use crate::loaders::scorecard::build_scorecard;
use crate::loaders::types::{AggregatedEntity, Grouping, MetricDataset, Scorecard};
use crate::services::metric_api::{MetricApi, ModelResolver, TimeWindow};

/// One full load cycle: model lookup, discovery, then the query ladder.
pub struct MetricPipeline {
    api: Arc<dyn MetricApi>,
    resolver: Arc<dyn ModelResolver>,
    profile: &'static EntityProfile,
    settings: LoaderSettings,
}

impl MetricPipeline {
    pub fn new(
        api: Arc<dyn MetricApi>,
        resolver: Arc<dyn ModelResolver>,
        profile: &'static EntityProfile,
        settings: LoaderSettings,
    ) -> Self {
        Self {
            api,
            resolver,
            profile,
            settings,
        }
    }

    /// Resolves the model id for the profile's metric, falling back to the
    /// profile's hardcoded id when the lookup has no usable answer.
    pub async fn resolve_model_id(&self) -> Result<String, LoadError> {
        let metric = self.profile.metric_name;
        let resolved = match self.resolver.resolve(metric).await {
            Ok(id) => id.map(|id| id.trim().to_string()).filter(|id| !id.is_empty()),
            Err(e) => {
                warn!(metric, error = %e, "Model lookup failed");
                None
            }
        };

        resolved
            .or_else(|| self.profile.fallback_model_id.map(str::to_string))
            .ok_or_else(|| LoadError::ModelLookup {
                metric: metric.to_string(),
            })
    }

    fn discovery_window(&self) -> Result<TimeWindow, LoadError> {
        TimeWindow::last_days(self.settings.long_window_days).map_err(LoadError::Window)
    }

    /// Runs discovery alone and returns the supported dimension names.
    pub async fn discover_dimensions(&self) -> Result<BTreeSet<String>, LoadError> {
        let model_id = self.resolve_model_id().await?;
        let discovery = discover(
            self.api.as_ref(),
            &model_id,
            self.discovery_window()?,
            self.settings.ignoring_hcts,
        )
        .await?;
        Ok(discovery.dimensions)
    }
}

#[async_trait::async_trait]
impl DatasetSource for MetricPipeline {
    #[tracing::instrument(skip(self), fields(kind = self.profile.kind))]
    async fn fetch(&self) -> Result<MetricDataset, LoadError> {
        let model_id = self.resolve_model_id().await?;
        let window = self.discovery_window()?;

        let discovery = match discover(
            self.api.as_ref(),
            &model_id,
            window,
            self.settings.ignoring_hcts,
        )
        .await
        {
            Ok(discovery) => discovery,
            Err(e) => {
                error!(error = %e, "Discovery failed, returning empty dataset");
                return Ok(MetricDataset::empty());
            }
        };

        let windows = QueryWindows {
            short_days: self.settings.short_window_days,
            long_days: self.settings.long_window_days,
        };

        Ok(plan_and_execute(
            self.api.as_ref(),
            &model_id,
            discovery,
            self.profile,
            windows,
            window,
            self.settings.ignoring_hcts,
        )
        .await)
    }
}

/// Entry point for one entity view. Construct once per process and share.
pub struct EntityLoader {
    profile: &'static EntityProfile,
    coalescer: Coalescer<MetricPipeline>,
}

impl EntityLoader {
    pub fn new(
        api: Arc<dyn MetricApi>,
        resolver: Arc<dyn ModelResolver>,
        profile: &'static EntityProfile,
        settings: LoaderSettings,
    ) -> Self {
        let ttl = settings.cache_ttl;
        let pipeline = MetricPipeline::new(api, resolver, profile, settings);
        Self {
            profile,
            coalescer: Coalescer::new(pipeline, ttl),
        }
    }

    pub fn profile(&self) -> &'static EntityProfile {
        self.profile
    }

    /// The shared dataset for this loader, from cache or a coalesced cycle.
    pub async fn get_data(&self) -> LoadResult {
        self.coalescer.get_data().await
    }

    pub async fn invalidate(&self) {
        self.coalescer.invalidate().await;
    }

    pub async fn discover_dimensions(&self) -> Result<BTreeSet<String>, LoadError> {
        self.coalescer.source().discover_dimensions().await
    }

    /// Aggregated entities, largest total amount first.
    ///
    /// Never fails: a failed cycle is logged and yields an empty list.
    pub async fn load_list(&self) -> Vec<AggregatedEntity> {
        let dataset = match self.get_data().await {
            Ok(dataset) => dataset,
            Err(e) => {
                error!(kind = self.profile.kind, error = %e, "Load failed, returning no data");
                return Vec::new();
            }
        };

        let entities = match dataset.grouping {
            Grouping::ByEntity => ranked(aggregate(&dataset.series, self.profile)),
            Grouping::Aggregate => aggregate_all(&dataset.series, self.profile)
                .into_iter()
                .collect(),
        };

        info!(
            kind = self.profile.kind,
            entities = entities.len(),
            grouping = ?dataset.grouping,
            "Entity list ready"
        );
        entities
    }

    /// Scorecards for every loaded entity, in list order.
    pub async fn scorecards(&self) -> Vec<Scorecard> {
        self.load_list().await.iter().map(build_scorecard).collect()
    }

    /// Scorecard for one entity code, if it is present in the current data.
    pub async fn scorecard(&self, code: &str) -> Option<Scorecard> {
        let code = code.trim();
        self.load_list()
            .await
            .iter()
            .find(|e| e.code == code)
            .map(build_scorecard)
    }
}
