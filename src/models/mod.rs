pub mod daily_metric;
pub mod google_fit;
