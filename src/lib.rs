pub mod config;
pub mod fetch;
pub mod infra;
pub mod loaders;
pub mod output;
pub mod services;
