mod client;

pub use client::OntologyMetricClient;
