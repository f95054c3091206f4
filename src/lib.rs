pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;

use axum::{
    middleware as layer,
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Assemble the gateway router: public liveness endpoints, the
/// bearer-token API surface, and the cookie-session console surface.
pub fn app() -> Router {
    let api = Router::new()
        .route("/api/auth/whoami", get(handlers::auth::whoami))
        .route("/api/admin/tenants/pools", get(handlers::admin::list_pools))
        .route(
            "/api/admin/tenants/:tenant_id/pool",
            delete(handlers::admin::invalidate_pool),
        )
        .route_layer(layer::from_fn(middleware::auth::auth_middleware));

    let console = Router::new()
        .route("/console/whoami", get(handlers::console::whoami))
        .route("/console/logout", post(handlers::console::logout))
        .route_layer(layer::from_fn(middleware::session::session_middleware))
        // Login stays outside the session layer
        .route("/console/login", post(handlers::console::login));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(api)
        .merge(console)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "HMS Gateway",
            "version": version,
            "description": "Multi-tenant authentication and data-isolation gateway",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/api/auth/whoami (protected - bearer token)",
                "admin": "/api/admin/tenants/* (protected - super admin)",
                "console": "/console/login, /console/whoami, /console/logout (cookie session)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::router::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
