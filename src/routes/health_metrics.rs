use actix_web::{delete, get, post, web, HttpResponse};
use chrono::NaiveDate;

use crate::db::health_metrics::HealthMetricStore;
use crate::handlers::health_metrics::delete_metric::delete_metric;
use crate::handlers::health_metrics::get_metrics::get_metrics;
use crate::handlers::health_metrics::sync_metrics::sync_metrics;
use crate::handlers::health_metrics::weight_trend::weight_trend;
use crate::middleware::auth::Claims;
use crate::models::daily_metric::SyncMetricsRequest;
use crate::services::SyncService;

#[post("/metrics/sync")]
async fn sync(
    request: web::Json<SyncMetricsRequest>,
    sync_service: web::Data<SyncService>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    sync_metrics(request, sync_service, claims).await
}

#[get("/metrics")]
async fn list(
    store: web::Data<dyn HealthMetricStore>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    get_metrics(store, claims).await
}

#[get("/metrics/weight_trend")]
async fn trend(
    store: web::Data<dyn HealthMetricStore>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    weight_trend(store, claims).await
}

#[delete("/metrics/{date}")]
async fn remove(
    date: web::Path<NaiveDate>,
    store: web::Data<dyn HealthMetricStore>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    delete_metric(date, store, claims).await
}
