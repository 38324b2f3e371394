pub mod delete_metric;
pub mod get_metrics;
pub mod sync_metrics;
pub mod weight_trend;
