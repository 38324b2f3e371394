pub mod google_fit;
pub mod sync_service;

pub use google_fit::{FitnessDataSource, GoogleFitClient, SyncWindow};
pub use sync_service::SyncService;
