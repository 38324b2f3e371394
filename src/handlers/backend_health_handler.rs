use actix_web::{HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

pub async fn backend_health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "timestamp": Utc::now()
    }))
}
