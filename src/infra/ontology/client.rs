use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use tracing::debug;

use crate::config::LoaderConfig;
use crate::fetch::auth::ApiKey;
use crate::fetch::{BasicClient, HttpClient, post_json};
use crate::services::metric_api::{MetricApi, QueryOptions, QueryResponse, QuerySpec};

const MODEL_QUERY_PATH: &str = "api/mdl-uniquery/v1/metric-models";

/// [`MetricApi`] over the ontology metric-model HTTP service.
pub struct OntologyMetricClient<C = ApiKey<BasicClient>> {
    base_url: reqwest::Url,
    http: C,
}

impl OntologyMetricClient {
    /// Builds a bearer-authenticated client from process configuration.
    pub fn from_config(config: &LoaderConfig) -> Result<Self> {
        let basic = BasicClient::with_timeouts(config.request_timeout, config.connect_timeout)?;
        let http = ApiKey::bearer(basic, &config.api_token)?;
        Self::with_client(&config.base_url, http)
    }
}

impl<C: HttpClient> OntologyMetricClient<C> {
    pub fn with_client(base_url: &str, http: C) -> Result<Self> {
        let base_url = reqwest::Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .with_context(|| format!("Invalid base URL '{base_url}'"))?;
        Ok(Self { base_url, http })
    }

    /// The query URL for `model_id`. The id is one percent-encoded path segment.
    fn model_url(&self, model_id: &str, options: QueryOptions) -> Result<reqwest::Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Base URL '{}' cannot carry a path", self.base_url))?
            .pop_if_empty()
            .extend(MODEL_QUERY_PATH.split('/'))
            .push(model_id);
        url.query_pairs_mut()
            .append_pair("include_model", bool_param(options.include_model))
            .append_pair("ignoring_hcts", bool_param(options.ignoring_hcts));
        Ok(url)
    }
}

fn bool_param(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

#[async_trait]
impl<C: HttpClient> MetricApi for OntologyMetricClient<C> {
    async fn query_model(
        &self,
        model_id: &str,
        spec: &QuerySpec,
        options: QueryOptions,
    ) -> Result<QueryResponse> {
        let url = self.model_url(model_id, options)?;
        debug!(%url, dimensions = ?spec.dimensions, "Querying metric model");

        let bytes = post_json(&self.http, url, spec).await?;
        let response: QueryResponse = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse response for model '{model_id}'"))?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_url_carries_flags() {
        let client =
            OntologyMetricClient::with_client("https://example.test/", BasicClient::new()).unwrap();
        let url = client
            .model_url(
                "m-1",
                QueryOptions {
                    include_model: true,
                    ignoring_hcts: false,
                },
            )
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://example.test/api/mdl-uniquery/v1/metric-models/m-1?include_model=true&ignoring_hcts=false"
        );
    }

    #[test]
    fn test_model_id_stays_one_path_segment() {
        let client =
            OntologyMetricClient::with_client("https://example.test/", BasicClient::new()).unwrap();
        let url = client
            .model_url(
                "a/b?c#d",
                QueryOptions {
                    include_model: false,
                    ignoring_hcts: true,
                },
            )
            .unwrap();

        assert_eq!(url.path(), "/api/mdl-uniquery/v1/metric-models/a%2Fb%3Fc%23d");
        assert_eq!(url.query(), Some("include_model=false&ignoring_hcts=true"));
        assert!(url.fragment().is_none());
    }

    #[test]
    fn test_base_path_prefix_is_kept() {
        let client =
            OntologyMetricClient::with_client("https://example.test/proxy/", BasicClient::new())
                .unwrap();
        let url = client
            .model_url(
                "m-1",
                QueryOptions {
                    include_model: true,
                    ignoring_hcts: true,
                },
            )
            .unwrap();

        assert_eq!(url.path(), "/proxy/api/mdl-uniquery/v1/metric-models/m-1");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(OntologyMetricClient::with_client("not a url", BasicClient::new()).is_err());
    }
}
