use axum::{middleware, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;

/// Assemble the full application router
pub fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes (token acquisition)
        .merge(auth_public_routes())
        // Protected API
        .merge(api_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes() -> Router {
    use axum::routing::post;

    Router::new()
        .route("/auth/register", post(public::auth::register))
        .route("/auth/login", post(public::auth::login))
}

fn api_routes() -> Router {
    use crate::handlers::protected::records;

    Router::new()
        .route("/api/auth/whoami", get(protected::auth::whoami))
        .route("/api/dashboard", get(protected::dashboard::summary))
        // Collection-level operations
        .route("/api/:collection", get(records::list).post(records::create))
        // Record-level operations
        .route(
            "/api/:collection/:id",
            get(records::get).patch(records::update).delete(records::delete),
        )
        .layer(middleware::from_fn(jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Workbench API",
            "version": version,
            "description": "Per-user records backend with dashboard summaries",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "public_auth": "/auth/register, /auth/login (public - token acquisition)",
                "auth": "/api/auth/whoami (protected)",
                "dashboard": "/api/dashboard (protected)",
                "records": "/api/:collection[/:id] (protected - builds, signals, privates, privacys, keys)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::DatabaseManager::health_check().await {
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
