//! Process configuration, read from the environment (after `.env` loading).

use anyhow::{Context, Result, ensure};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://dip.aishu.cn";

/// Upper bound for either query window, in days.
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Tunables consumed by the loader core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderSettings {
    /// How long a successful load is served from cache.
    pub cache_ttl: Duration,
    /// First window tried for every dimension tier.
    pub short_window_days: i64,
    /// Retry window used when the short window comes back empty.
    pub long_window_days: i64,
    pub ignoring_hcts: bool,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            short_window_days: 1,
            long_window_days: 365,
            ignoring_hcts: true,
        }
    }
}

/// Connection and loader settings for one process.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub base_url: String,
    pub api_token: String,
    pub model_map_path: Option<String>,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub settings: LoaderSettings,
}

impl LoaderConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = LoaderSettings::default();

        let api_token = get("ONTOLOGY_API_TOKEN").context("ONTOLOGY_API_TOKEN must be set")?;

        let short_window_days = parse_or(&get, "SHORT_WINDOW_DAYS", defaults.short_window_days)?;
        let long_window_days = parse_or(&get, "LONG_WINDOW_DAYS", defaults.long_window_days)?;
        ensure!(
            (1..=MAX_WINDOW_DAYS).contains(&long_window_days),
            "LONG_WINDOW_DAYS must be between 1 and {MAX_WINDOW_DAYS}, got {long_window_days}"
        );
        ensure!(
            (1..=long_window_days).contains(&short_window_days),
            "SHORT_WINDOW_DAYS must be between 1 and LONG_WINDOW_DAYS ({long_window_days}), got {short_window_days}"
        );

        Ok(Self {
            base_url: get("ONTOLOGY_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_token,
            model_map_path: get("MODEL_MAP_PATH"),
            request_timeout: Duration::from_secs(parse_or(&get, "REQUEST_TIMEOUT_SECS", 120)?),
            connect_timeout: Duration::from_secs(parse_or(&get, "CONNECT_TIMEOUT_SECS", 10)?),
            settings: LoaderSettings {
                cache_ttl: Duration::from_secs(parse_or(
                    &get,
                    "METRIC_CACHE_TTL_SECS",
                    defaults.cache_ttl.as_secs(),
                )?),
                short_window_days,
                long_window_days,
                ignoring_hcts: defaults.ignoring_hcts,
            },
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
