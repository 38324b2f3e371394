use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use crate::middleware::auth::Claims;
use crate::models::daily_metric::{SyncMetricsRequest, SyncMetricsResponse};
use crate::services::sync_service::SyncError;
use crate::services::{SyncService, SyncWindow};

#[tracing::instrument(
    name = "Sync health metrics handler",
    skip(request, sync_service, claims),
    fields(
        username = %claims.username
    )
)]
pub async fn sync_metrics(
    request: web::Json<SyncMetricsRequest>,
    sync_service: web::Data<SyncService>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    let user_id = match claims.user_id() {
        Some(id) => id,
        None => {
            tracing::error!("Failed to parse user ID from claims");
            return HttpResponse::InternalServerError().json(json!({
                "status": "error",
                "message": "Invalid user ID"
            }));
        }
    };

    let default_window = SyncWindow::default_window(Utc::now());
    let window = SyncWindow::new(
        request.window_start.unwrap_or(default_window.start),
        request.window_end.unwrap_or(default_window.end),
    );

    match sync_service
        .sync(user_id, &request.access_token, &window)
        .await
    {
        Ok(report) => {
            tracing::info!("Synced {} day(s) successfully", report.days_synced.len());
            HttpResponse::Ok().json(SyncMetricsResponse {
                success: true,
                message: "Health metrics synced successfully".to_string(),
                days_synced: report.days_synced,
                points_dropped: report.points_dropped,
                timestamp: report.fetched_at,
            })
        }
        Err(SyncError::Fetch(e)) => {
            tracing::error!("Provider fetch failed: {}", e);
            HttpResponse::BadGateway().json(json!({
                "success": false,
                "message": e.to_string(),
                "timestamp": Utc::now()
            }))
        }
        Err(SyncError::Partial {
            completed,
            failed_day,
            source,
        }) => {
            tracing::error!("Sync stopped at {}: {}", failed_day, source);
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": format!("Sync stopped at {}", failed_day),
                "days_synced": completed,
                "failed_day": failed_day,
                "timestamp": Utc::now()
            }))
        }
    }
}
