use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::health_metrics::{HealthMetricStore, StoreError};
use crate::models::daily_metric::{DailyHealthMetric, DailyMetricPatch};

/// BTreeMap-backed store with the same observable semantics as the
/// Postgres implementation. Used by the integration tests and for
/// database-less local runs.
#[derive(Default)]
pub struct InMemoryHealthMetricStore {
    records: RwLock<BTreeMap<(Uuid, NaiveDate), DailyHealthMetric>>,
}

impl InMemoryHealthMetricStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HealthMetricStore for InMemoryHealthMetricStore {
    async fn get(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> Result<Option<DailyHealthMetric>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(&(user_id, day)).cloned())
    }

    async fn upsert(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        patch: &DailyMetricPatch,
    ) -> Result<DailyHealthMetric, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .entry((user_id, day))
            .or_insert_with(|| DailyHealthMetric::empty(user_id, day, Utc::now()));
        patch.apply_to(record);
        Ok(record.clone())
    }

    async fn delete(&self, user_id: Uuid, day: NaiveDate) -> Result<u64, StoreError> {
        let mut records = self.records.write().await;
        Ok(records.remove(&(user_id, day)).map_or(0, |_| 1))
    }

    async fn get_all_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<DailyHealthMetric>, StoreError> {
        let records = self.records.read().await;
        // The composite key sorts by user first, so the range scan comes
        // out in ascending calendar_date order.
        Ok(records
            .range((user_id, NaiveDate::MIN)..=(user_id, NaiveDate::MAX))
            .map(|(_, record)| record.clone())
            .collect())
    }
}
