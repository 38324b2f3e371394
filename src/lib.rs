use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{http, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub mod config;
pub mod db;
mod handlers;
pub mod metrics;
mod middleware;
pub mod models;
mod routes;
pub mod services;
pub mod telemetry;
pub mod utils;

use crate::config::jwt::JwtSettings;
use crate::db::health_metrics::HealthMetricStore;
use crate::routes::init_routes;
use crate::services::{FitnessDataSource, SyncService};

/// Assemble the app: the store and the provider client are constructed by
/// the caller and injected here; the orchestrator shares them.
pub fn run(
    listener: TcpListener,
    store: Arc<dyn HealthMetricStore>,
    source: Arc<dyn FitnessDataSource>,
    jwt_settings: JwtSettings,
) -> Result<Server, std::io::Error> {
    // Wrap using web::Data, which boils down to an Arc smart pointer
    let store_data: web::Data<dyn HealthMetricStore> = web::Data::from(store.clone());
    let sync_service = web::Data::new(SyncService::new(source, store));
    let jwt_settings = web::Data::new(jwt_settings);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000")
            .allowed_methods(vec!["GET", "POST", "DELETE"])
            .allowed_headers(vec![
                http::header::AUTHORIZATION,
                http::header::ACCEPT,
                http::header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            // Get a pointer copy and attach it to the application state
            .app_data(store_data.clone())
            .app_data(sync_service.clone())
            .app_data(jwt_settings.clone())
            .configure(init_routes)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
