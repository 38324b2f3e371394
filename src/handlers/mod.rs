pub mod backend_health_handler;
pub mod health_metrics;
