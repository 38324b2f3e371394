use actix_web::{web, HttpResponse};

use crate::db::health_metrics::HealthMetricStore;
use crate::middleware::auth::Claims;

#[tracing::instrument(
    name = "Get health metrics",
    skip(store, claims),
    fields(
        username = %claims.username
    )
)]
pub async fn get_metrics(
    store: web::Data<dyn HealthMetricStore>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    let user_id = match claims.user_id() {
        Some(id) => id,
        None => return HttpResponse::BadRequest().finish(),
    };

    match store.get_all_for_user(user_id).await {
        Ok(records) => HttpResponse::Ok().json(records),
        Err(e) => {
            tracing::error!("Failed to list health metrics: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
