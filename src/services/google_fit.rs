use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde_json::json;
use thiserror::Error;

use crate::models::google_fit::{ErrorResponse, GoogleFitAggregateResponse};

const WEIGHT_SOURCE: &str = "derived:com.google.weight:com.google.android.gms:merge_weight";
const BLOOD_PRESSURE_SOURCE: &str =
    "derived:com.google.blood_pressure:com.google.android.gms:merged";
const NUTRITION_SOURCE: &str = "derived:com.google.nutrition:com.google.android.gms:merged";

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;
const DEFAULT_WINDOW_DAYS: i64 = 2;
const DEFAULT_ERROR_MESSAGE: &str = "Failed to fetch data sources.";

/// Time window a sync covers, in wall-clock UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SyncWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The dashboard's default: the last two days up to now.
    pub fn default_window(now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::days(DEFAULT_WINDOW_DAYS),
            end: now,
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Provider(String),
}

/// External fetch collaborator: one call per sync, returning the provider's
/// bucketed aggregate response for the window.
#[async_trait]
pub trait FitnessDataSource: Send + Sync {
    async fn fetch_window(
        &self,
        access_token: &str,
        window: &SyncWindow,
    ) -> Result<GoogleFitAggregateResponse, FetchError>;
}

pub struct GoogleFitClient {
    base_url: String,
    client: Client,
}

impl GoogleFitClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl FitnessDataSource for GoogleFitClient {
    #[tracing::instrument(name = "Fetch provider window", skip(self, access_token), fields(window_start = %window.start, window_end = %window.end))]
    async fn fetch_window(
        &self,
        access_token: &str,
        window: &SyncWindow,
    ) -> Result<GoogleFitAggregateResponse, FetchError> {
        let url = format!("{}/users/me/dataset:aggregate", self.base_url);
        let body = json!({
            "aggregateBy": [
                { "dataSourceId": WEIGHT_SOURCE },
                { "dataSourceId": BLOOD_PRESSURE_SOURCE },
                { "dataSourceId": NUTRITION_SOURCE },
            ],
            "bucketByTime": { "durationMillis": DAY_MILLIS },
            "startTimeMillis": window.start.timestamp_millis(),
            "endTimeMillis": window.end.timestamp_millis(),
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.error)
                .and_then(|error| error.message)
                .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());
            tracing::error!("Provider returned {}: {}", status, message);
            return Err(FetchError::Provider(message));
        }

        let data = response.json::<GoogleFitAggregateResponse>().await?;
        Ok(data)
    }
}
