use actix_web::web;

pub mod backend_health;
pub mod health_metrics;

use crate::middleware::auth::AuthMiddleware;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(backend_health::backend_health);

    // Health-metric routes (require authentication)
    cfg.service(
        web::scope("/health")
            .wrap(AuthMiddleware)
            .service(health_metrics::sync)
            .service(health_metrics::trend)
            .service(health_metrics::list)
            .service(health_metrics::remove),
    );
}
