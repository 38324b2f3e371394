use std::net::TcpListener;
use std::sync::Arc;

use secrecy::ExposeSecret;

use healthdash_backend::config::settings::{get_config, get_jwt_settings};
use healthdash_backend::db::health_metrics::PostgresHealthMetricStore;
use healthdash_backend::run;
use healthdash_backend::services::GoogleFitClient;
use healthdash_backend::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Panic if we can't read the config
    let config = get_config().expect("Failed to read the config.");

    let subscriber = get_subscriber(
        "healthdash-backend".into(),
        config.application.log_level.clone(),
        std::io::stdout,
    );
    init_subscriber(subscriber);

    let jwt_settings = get_jwt_settings(&config);

    let store = PostgresHealthMetricStore::connect(
        config.database.connection_string().expose_secret(),
        32,
    )
    .await
    .expect("Failed to create Postgres connection pool");

    if let Err(e) = store.run_migrations().await {
        tracing::error!("Failed to run database migrations: {}", e);
        std::process::exit(1);
    }

    let source = GoogleFitClient::new(config.provider.api_base_url.clone());

    let address = format!("{}:{}", config.application.host, config.application.port);
    let listener = TcpListener::bind(&address)?;

    run(
        listener,
        Arc::new(store),
        Arc::new(source),
        jwt_settings,
    )?
    .await
}
