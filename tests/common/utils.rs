use std::net::TcpListener;
use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use once_cell::sync::Lazy;
use secrecy::ExposeSecret;
use serde::Serialize;
use uuid::Uuid;

use healthdash_backend::config::settings::{get_config, get_jwt_settings};
use healthdash_backend::db::health_metrics::HealthMetricStore;
use healthdash_backend::db::in_memory::InMemoryHealthMetricStore;
use healthdash_backend::run;
use healthdash_backend::services::GoogleFitClient;
use healthdash_backend::telemetry::{get_subscriber, init_subscriber};

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryHealthMetricStore>,
    jwt_secret: String,
}

/// Spin up the app on a random port, backed by the in-memory store and a
/// provider client pointed at `provider_url` (a wiremock server in tests).
pub async fn spawn_app(provider_url: &str) -> TestApp {
    // The first time `initialize` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    Lazy::force(&TRACING);

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    // Get port assigned by the OS
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let configuration = get_config().expect("Failed to read configuration.");
    let jwt_secret = configuration.jwt.secret.expose_secret().to_string();
    let jwt_settings = get_jwt_settings(&configuration);

    let store = Arc::new(InMemoryHealthMetricStore::new());
    let source = Arc::new(GoogleFitClient::new(provider_url.to_string()));

    let server = run(
        listener,
        store.clone() as Arc<dyn HealthMetricStore>,
        source,
        jwt_settings,
    )
    .expect("Failed to bind address");
    // Launch the server as a background task
    let _ = tokio::spawn(server);

    TestApp {
        address,
        store,
        jwt_secret,
    }
}

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    username: String,
    exp: usize,
}

impl TestApp {
    /// Mint a bearer token the auth middleware accepts. Token issuance is
    /// not part of this service, so tests sign their own.
    pub fn mint_token(&self, user_id: Uuid, username: &str) -> String {
        let claims = TestClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .expect("Failed to mint test token")
    }
}
