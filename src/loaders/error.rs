use thiserror::Error;

/// Failures of one load cycle.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no model id configured for metric '{metric}'")]
    ModelLookup { metric: String },

    #[error("dimension discovery failed for model '{model_id}': {source:#}")]
    Discovery {
        model_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("query on model '{model_id}' with dimensions {dimensions:?} failed: {source:#}")]
    Query {
        model_id: String,
        dimensions: Vec<String>,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid query window: {0:#}")]
    Window(#[source] anyhow::Error),

    #[error("load cycle aborted: {0}")]
    Aborted(String),
}
