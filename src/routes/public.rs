use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Unauthenticated endpoints used by monitoring and load balancers.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Process liveness. Never touches the database.
        .route("/health", get(|| async { "ok" }))
        // GET /health/db
        // Checks one pooled connection out and runs `SELECT 1` on it.
        .route("/health/db", get(handlers::health_db))
}
