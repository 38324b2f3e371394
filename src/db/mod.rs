pub mod health_metrics;
pub mod in_memory;
