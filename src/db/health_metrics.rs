use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use thiserror::Error;
use uuid::Uuid;

use crate::models::daily_metric::{DailyHealthMetric, DailyMetricPatch};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] MigrateError),
}

/// Keyed store for daily health records; key = (user, calendar day).
/// The merger decides what to write, the store only applies it: families
/// absent from a patch keep their stored values.
#[async_trait]
pub trait HealthMetricStore: Send + Sync {
    async fn get(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> Result<Option<DailyHealthMetric>, StoreError>;

    async fn upsert(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        patch: &DailyMetricPatch,
    ) -> Result<DailyHealthMetric, StoreError>;

    async fn delete(&self, user_id: Uuid, day: NaiveDate) -> Result<u64, StoreError>;

    /// All records for the user, calendar date ascending.
    async fn get_all_for_user(&self, user_id: Uuid)
        -> Result<Vec<DailyHealthMetric>, StoreError>;
}

#[derive(Clone)]
pub struct PostgresHealthMetricStore {
    pool: PgPool,
}

impl PostgresHealthMetricStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

const RECORD_COLUMNS: &str = r#"
    id,
    user_id,
    calendar_date,
    weight,
    weight_source_nanos,
    systolic,
    diastolic,
    blood_pressure_source_nanos,
    calories,
    sodium,
    protein,
    fat,
    nutrition_source_nanos,
    last_fetched_at,
    created_at
"#;

fn record_from_row(row: &sqlx::postgres::PgRow) -> Result<DailyHealthMetric, sqlx::Error> {
    Ok(DailyHealthMetric {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        calendar_date: row.try_get("calendar_date")?,
        weight: row.try_get("weight")?,
        weight_source_nanos: row.try_get("weight_source_nanos")?,
        systolic: row.try_get("systolic")?,
        diastolic: row.try_get("diastolic")?,
        blood_pressure_source_nanos: row.try_get("blood_pressure_source_nanos")?,
        calories: row.try_get("calories")?,
        sodium: row.try_get("sodium")?,
        protein: row.try_get("protein")?,
        fat: row.try_get("fat")?,
        nutrition_source_nanos: row.try_get("nutrition_source_nanos")?,
        last_fetched_at: row.try_get("last_fetched_at")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl HealthMetricStore for PostgresHealthMetricStore {
    #[tracing::instrument(name = "Get daily metric", skip(self), fields(user_id = %user_id, day = %day))]
    async fn get(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> Result<Option<DailyHealthMetric>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM daily_health_metrics
            WHERE user_id = $1 AND calendar_date = $2
            "#
        ))
        .bind(user_id)
        .bind(day)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| record_from_row(&row))
            .transpose()
            .map_err(StoreError::from)
    }

    #[tracing::instrument(name = "Upsert daily metric", skip(self, patch), fields(user_id = %user_id, day = %day))]
    async fn upsert(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        patch: &DailyMetricPatch,
    ) -> Result<DailyHealthMetric, StoreError> {
        // Presence flags gate the per-family column updates on conflict, so
        // a family absent from the patch never clobbers stored values.
        let weight = patch.weight.as_ref();
        let bp = patch.blood_pressure.as_ref();
        let nutrition = patch.nutrition.as_ref();

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO daily_health_metrics (
                id,
                user_id,
                calendar_date,
                weight,
                weight_source_nanos,
                systolic,
                diastolic,
                blood_pressure_source_nanos,
                calories,
                sodium,
                protein,
                fat,
                nutrition_source_nanos,
                last_fetched_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (user_id, calendar_date) DO UPDATE SET
                weight = CASE WHEN $15 THEN EXCLUDED.weight
                              ELSE daily_health_metrics.weight END,
                weight_source_nanos = CASE WHEN $15 THEN EXCLUDED.weight_source_nanos
                              ELSE daily_health_metrics.weight_source_nanos END,
                systolic = CASE WHEN $16 THEN EXCLUDED.systolic
                              ELSE daily_health_metrics.systolic END,
                diastolic = CASE WHEN $16 THEN EXCLUDED.diastolic
                              ELSE daily_health_metrics.diastolic END,
                blood_pressure_source_nanos = CASE WHEN $16 THEN EXCLUDED.blood_pressure_source_nanos
                              ELSE daily_health_metrics.blood_pressure_source_nanos END,
                calories = CASE WHEN $17 THEN EXCLUDED.calories
                              ELSE daily_health_metrics.calories END,
                sodium = CASE WHEN $17 THEN EXCLUDED.sodium
                              ELSE daily_health_metrics.sodium END,
                protein = CASE WHEN $17 THEN EXCLUDED.protein
                              ELSE daily_health_metrics.protein END,
                fat = CASE WHEN $17 THEN EXCLUDED.fat
                              ELSE daily_health_metrics.fat END,
                nutrition_source_nanos = CASE WHEN $17 THEN EXCLUDED.nutrition_source_nanos
                              ELSE daily_health_metrics.nutrition_source_nanos END,
                last_fetched_at = EXCLUDED.last_fetched_at
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(day)
        .bind(weight.and_then(|w| w.weight))
        .bind(weight.map(|w| w.source_nanos))
        .bind(bp.and_then(|b| b.systolic))
        .bind(bp.and_then(|b| b.diastolic))
        .bind(bp.map(|b| b.source_nanos))
        .bind(nutrition.and_then(|n| n.calories))
        .bind(nutrition.and_then(|n| n.sodium))
        .bind(nutrition.and_then(|n| n.protein))
        .bind(nutrition.and_then(|n| n.fat))
        .bind(nutrition.map(|n| n.source_nanos))
        .bind(patch.last_fetched_at)
        .bind(weight.is_some())
        .bind(bp.is_some())
        .bind(nutrition.is_some())
        .fetch_one(&self.pool)
        .await?;

        record_from_row(&row).map_err(StoreError::from)
    }

    #[tracing::instrument(name = "Delete daily metric", skip(self), fields(user_id = %user_id, day = %day))]
    async fn delete(&self, user_id: Uuid, day: NaiveDate) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM daily_health_metrics
            WHERE user_id = $1 AND calendar_date = $2
            "#,
        )
        .bind(user_id)
        .bind(day)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(name = "List daily metrics", skip(self), fields(user_id = %user_id))]
    async fn get_all_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<DailyHealthMetric>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM daily_health_metrics
            WHERE user_id = $1
            ORDER BY calendar_date ASC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| record_from_row(row).map_err(StoreError::from))
            .collect()
    }
}
