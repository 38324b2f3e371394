use actix_web::{web, HttpResponse};

use crate::db::health_metrics::HealthMetricStore;
use crate::middleware::auth::Claims;
use crate::utils::rolling_average::weight_trend_series;

#[tracing::instrument(
    name = "Get weight trend",
    skip(store, claims),
    fields(
        username = %claims.username
    )
)]
pub async fn weight_trend(
    store: web::Data<dyn HealthMetricStore>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    let user_id = match claims.user_id() {
        Some(id) => id,
        None => return HttpResponse::BadRequest().finish(),
    };

    match store.get_all_for_user(user_id).await {
        Ok(records) => HttpResponse::Ok().json(weight_trend_series(&records)),
        Err(e) => {
            tracing::error!("Failed to compute weight trend: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
