use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::db::health_metrics::{HealthMetricStore, StoreError};
use crate::metrics::extract::{extract_fragment, MetricFragment};
use crate::metrics::merge::{group_by_day, merge_day};
use crate::services::google_fit::{FetchError, FitnessDataSource, SyncWindow};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A store call failed partway through the per-day write loop. Days in
    /// `completed` were written and need no retry; the failing day and
    /// everything after it were not.
    #[error("sync stopped at {failed_day} after {} day(s) were written: {source}", .completed.len())]
    Partial {
        completed: Vec<NaiveDate>,
        failed_day: NaiveDate,
        #[source]
        source: StoreError,
    },
}

#[derive(Debug)]
pub struct SyncReport {
    pub days_synced: Vec<NaiveDate>,
    pub points_seen: usize,
    pub points_dropped: usize,
    pub fetched_at: DateTime<Utc>,
}

/// Drives one user's sync: fetch the window, extract fragments, merge them
/// against the stored records, write the changed days one at a time.
pub struct SyncService {
    source: Arc<dyn FitnessDataSource>,
    store: Arc<dyn HealthMetricStore>,
}

impl SyncService {
    pub fn new(source: Arc<dyn FitnessDataSource>, store: Arc<dyn HealthMetricStore>) -> Self {
        Self { source, store }
    }

    /// Concurrent calls for the same user must be serialized by the caller;
    /// the store's per-record writes are the only arbiter between them.
    #[tracing::instrument(name = "Sync health metrics", skip(self, access_token), fields(user_id = %user_id))]
    pub async fn sync(
        &self,
        user_id: Uuid,
        access_token: &str,
        window: &SyncWindow,
    ) -> Result<SyncReport, SyncError> {
        let fetched_at = Utc::now();
        let response = self.source.fetch_window(access_token, window).await?;

        let mut fragments = Vec::new();
        let mut points_seen = 0usize;
        let mut points_dropped = 0usize;
        for bucket in &response.bucket {
            for dataset in &bucket.dataset {
                for point in &dataset.point {
                    points_seen += 1;
                    match extract_fragment(point) {
                        Ok(MetricFragment::Unrecognized { data_type }) => {
                            tracing::warn!(
                                "Dropping point with unrecognized data type '{}'",
                                data_type
                            );
                            points_dropped += 1;
                        }
                        Ok(fragment) => fragments.push(fragment),
                        Err(reason) => {
                            tracing::warn!(
                                "Dropping invalid {} point: {}",
                                point.data_type_name,
                                reason
                            );
                            points_dropped += 1;
                        }
                    }
                }
            }
        }

        // BTreeMap iteration makes the write order ascending by day, so a
        // partial failure always names a well-defined completed prefix.
        let mut days_synced = Vec::new();
        for (day, day_fragments) in group_by_day(fragments) {
            let existing = self
                .store
                .get(user_id, day)
                .await
                .map_err(|source| SyncError::Partial {
                    completed: days_synced.clone(),
                    failed_day: day,
                    source,
                })?;

            let Some(patch) = merge_day(existing.as_ref(), &day_fragments, fetched_at) else {
                tracing::debug!("No changes for {}, skipping write", day);
                continue;
            };

            self.store
                .upsert(user_id, day, &patch)
                .await
                .map_err(|source| SyncError::Partial {
                    completed: days_synced.clone(),
                    failed_day: day,
                    source,
                })?;
            days_synced.push(day);
        }

        tracing::info!(
            "Synced {} day(s) for user ({} of {} points dropped)",
            days_synced.len(),
            points_dropped,
            points_seen
        );

        Ok(SyncReport {
            days_synced,
            points_seen,
            points_dropped,
            fetched_at,
        })
    }
}
