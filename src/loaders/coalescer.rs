//! Single-slot cache with in-flight request sharing.
//!
//! The slot moves through Empty -> Fetching -> Cached -> Empty. While a fetch
//! is outstanding every caller awaits the same shared future, so one cycle
//! issues one sequence of backend calls no matter how many callers arrive.
//! Failures are never cached.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::loaders::error::LoadError;
use crate::loaders::types::MetricDataset;

pub type LoadResult = Result<Arc<MetricDataset>, Arc<LoadError>>;

type SharedLoad = Shared<BoxFuture<'static, LoadResult>>;

/// Produces one dataset per load cycle.
#[async_trait::async_trait]
pub trait DatasetSource: Send + Sync + 'static {
    async fn fetch(&self) -> Result<MetricDataset, LoadError>;
}

#[derive(Debug)]
struct CacheEntry {
    data: Arc<MetricDataset>,
    fetched_at: Instant,
}

#[derive(Default)]
struct Slot {
    cached: Option<CacheEntry>,
    in_flight: Option<(u64, SharedLoad)>,
    cycle: u64,
}

pub struct Coalescer<S> {
    source: Arc<S>,
    ttl: Duration,
    slot: Arc<Mutex<Slot>>,
}

impl<S: DatasetSource> Coalescer<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source: Arc::new(source),
            ttl,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the cached dataset while fresh, otherwise joins or starts a cycle.
    pub async fn get_data(&self) -> LoadResult {
        let pending = {
            let mut guard = self.slot.lock().await;
            let slot = &mut *guard;

            if let Some(entry) = &slot.cached {
                if entry.fetched_at.elapsed() < self.ttl {
                    debug!(
                        age_ms = entry.fetched_at.elapsed().as_millis() as u64,
                        "Serving cached dataset"
                    );
                    return Ok(entry.data.clone());
                }
                debug!("Cached dataset expired");
                slot.cached = None;
            }

            match &slot.in_flight {
                Some((cycle, pending)) => {
                    debug!(cycle, "Joining in-flight load");
                    pending.clone()
                }
                None => {
                    slot.cycle += 1;
                    let cycle = slot.cycle;
                    let pending = self.start_cycle(cycle);
                    slot.in_flight = Some((cycle, pending.clone()));
                    pending
                }
            }
        };

        pending.await
    }

    /// Drops the cached dataset and forgets any in-flight marker.
    ///
    /// An outstanding fetch is not cancelled; when it finishes it still
    /// stores its result.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        slot.cached = None;
        slot.in_flight = None;
        info!("Dataset cache invalidated");
    }

    fn start_cycle(&self, cycle: u64) -> SharedLoad {
        let source = self.source.clone();
        let slot = self.slot.clone();
        info!(cycle, "Starting load cycle");

        // Spawned so the cycle runs to completion even if every caller goes away.
        let handle = tokio::spawn(async move {
            let result: LoadResult = source.fetch().await.map(Arc::new).map_err(Arc::new);

            let mut guard = slot.lock().await;
            if matches!(&guard.in_flight, Some((current, _)) if *current == cycle) {
                guard.in_flight = None;
            }
            match &result {
                Ok(data) => {
                    guard.cached = Some(CacheEntry {
                        data: data.clone(),
                        fetched_at: Instant::now(),
                    });
                    info!(cycle, series = data.series.len(), "Load cycle complete");
                }
                Err(e) => warn!(cycle, error = %e, "Load cycle failed"),
            }
            result
        });

        async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => Err(Arc::new(LoadError::Aborted(e.to_string()))),
            }
        }
        .boxed()
        .shared()
    }
}
