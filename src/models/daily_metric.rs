use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Canonical per-user/per-day health record. At most one row exists per
/// (user_id, calendar_date); each metric family carries its own
/// `*_source_nanos` provenance watermark.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyHealthMetric {
    pub id: Uuid,
    pub user_id: Uuid,
    pub calendar_date: NaiveDate,
    pub weight: Option<f64>,
    pub weight_source_nanos: Option<i64>,
    pub systolic: Option<f64>,
    pub diastolic: Option<f64>,
    pub blood_pressure_source_nanos: Option<i64>,
    pub calories: Option<f64>,
    pub sodium: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub nutrition_source_nanos: Option<i64>,
    pub last_fetched_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl DailyHealthMetric {
    /// Empty shell for a day that has no stored record yet.
    pub fn empty(user_id: Uuid, calendar_date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            calendar_date,
            weight: None,
            weight_source_nanos: None,
            systolic: None,
            diastolic: None,
            blood_pressure_source_nanos: None,
            calories: None,
            sodium: None,
            protein: None,
            fat: None,
            nutrition_source_nanos: None,
            last_fetched_at: now,
            created_at: now,
        }
    }
}

/// Per-family mutations for one (user, day) record. A family left as `None`
/// must not be touched by the store; `last_fetched_at` is always written.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyMetricPatch {
    pub weight: Option<WeightUpdate>,
    pub blood_pressure: Option<BloodPressureUpdate>,
    pub nutrition: Option<NutritionUpdate>,
    pub last_fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightUpdate {
    pub weight: Option<f64>,
    pub source_nanos: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BloodPressureUpdate {
    pub systolic: Option<f64>,
    pub diastolic: Option<f64>,
    pub source_nanos: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NutritionUpdate {
    pub calories: Option<f64>,
    pub sodium: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub source_nanos: i64,
}

impl DailyMetricPatch {
    pub fn is_empty(&self) -> bool {
        self.weight.is_none() && self.blood_pressure.is_none() && self.nutrition.is_none()
    }

    /// Apply the patch to an in-memory record, mirroring the conditional
    /// column updates the Postgres upsert performs.
    pub fn apply_to(&self, record: &mut DailyHealthMetric) {
        if let Some(weight) = &self.weight {
            record.weight = weight.weight;
            record.weight_source_nanos = Some(weight.source_nanos);
        }
        if let Some(bp) = &self.blood_pressure {
            record.systolic = bp.systolic;
            record.diastolic = bp.diastolic;
            record.blood_pressure_source_nanos = Some(bp.source_nanos);
        }
        if let Some(nutrition) = &self.nutrition {
            record.calories = nutrition.calories;
            record.sodium = nutrition.sodium;
            record.protein = nutrition.protein;
            record.fat = nutrition.fat;
            record.nutrition_source_nanos = Some(nutrition.source_nanos);
        }
        record.last_fetched_at = self.last_fetched_at;
    }
}

#[derive(Debug, Deserialize)]
pub struct SyncMetricsRequest {
    pub access_token: String,
    #[serde(default)]
    pub window_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub window_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct SyncMetricsResponse {
    pub success: bool,
    pub message: String,
    pub days_synced: Vec<NaiveDate>,
    pub points_dropped: usize,
    pub timestamp: DateTime<Utc>,
}

/// One entry of the weight-trend series served to the dashboard.
#[derive(Debug, Serialize, PartialEq)]
pub struct WeightTrendPoint {
    pub date: NaiveDate,
    pub weight: Option<f64>,
    pub moving_avg_weight: Option<f64>,
}
