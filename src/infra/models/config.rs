use anyhow::{Context, Result};
use std::collections::HashMap;

use crate::services::metric_api::ModelResolver;

/// Maps human-readable metric names to backend model ids.
///
/// Stored as a plain JSON object on disk:
/// ```json
/// {
///   "supplier_purchase_amount": "d2f7k1nuqc6c73d1l5r0",
///   "customer_sales_amount": "d2f7k9fuqc6c73d1l5rg"
/// }
/// ```
#[derive(Debug, Default)]
pub struct ModelIdConfig {
    entries: HashMap<String, String>,
}

impl ModelIdConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model map '{path}'"))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let entries: HashMap<String, String> =
            serde_json::from_str(content).context("Model map must be a JSON object of strings")?;
        Ok(Self { entries })
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the model id for `metric_name`, if one is configured.
    pub fn get(&self, metric_name: &str) -> Option<&str> {
        self.entries
            .get(metric_name)
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
    }
}

#[async_trait::async_trait]
impl ModelResolver for ModelIdConfig {
    async fn resolve(&self, metric_name: &str) -> Result<Option<String>> {
        Ok(self.get(metric_name).map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_lookup() {
        let config = ModelIdConfig::parse(r#"{"a": "m-1", "b": "  "}"#).unwrap();

        assert_eq!(config.get("a"), Some("m-1"));
        assert_eq!(config.get("b"), None);
        assert_eq!(config.get("missing"), None);
    }

    #[test]
    fn test_parse_rejects_non_string_values() {
        assert!(ModelIdConfig::parse(r#"{"a": 1}"#).is_err());
    }

    #[tokio::test]
    async fn test_resolver_returns_none_when_unset() {
        let config = ModelIdConfig::from_entries([("a", "m-1")]);

        assert_eq!(config.resolve("a").await.unwrap().as_deref(), Some("m-1"));
        assert!(config.resolve("z").await.unwrap().is_none());
    }
}
