use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde_json::json;

use crate::db::health_metrics::HealthMetricStore;
use crate::middleware::auth::Claims;

#[tracing::instrument(
    name = "Delete health metric",
    skip(store, claims),
    fields(
        username = %claims.username,
        date = %date
    )
)]
pub async fn delete_metric(
    date: web::Path<NaiveDate>,
    store: web::Data<dyn HealthMetricStore>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    let user_id = match claims.user_id() {
        Some(id) => id,
        None => return HttpResponse::BadRequest().finish(),
    };

    match store.delete(user_id, *date).await {
        Ok(deleted) => HttpResponse::Ok().json(json!({ "deleted": deleted })),
        Err(e) => {
            tracing::error!("Failed to delete health metric: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
