pub mod metric_api;
