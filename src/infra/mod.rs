pub mod models;
pub mod ontology;
