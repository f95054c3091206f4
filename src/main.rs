use chrono::Duration;

use hms_gateway::auth::session::SessionStore;
use hms_gateway::database::registry::TenantRegistry;
use hms_gateway::{config, database};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting HMS gateway in {:?} mode", config.environment);

    // Fatal misconfiguration is caught before serving, never per request
    if let Err(e) = config.security.algorithm() {
        panic!("invalid security configuration: {}", e);
    }
    if let Err(e) = database::router::verify_routing_table() {
        panic!("invalid storage routing table: {}", e);
    }

    // Background housekeeping: drop idle tenant pools and dead sessions
    tokio::spawn(async {
        let cfg = config::config();
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            TenantRegistry::instance()
                .evict_idle(Duration::seconds(cfg.database.idle_eviction_secs as i64))
                .await;
            SessionStore::instance()
                .purge_expired(
                    Duration::seconds(cfg.session.idle_timeout_secs as i64),
                    Duration::seconds(cfg.session.absolute_timeout_secs as i64),
                )
                .await;
        }
    });

    let app = hms_gateway::app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("HMS_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("HMS gateway listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
