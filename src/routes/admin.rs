use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Nested under `/api/admin`. The router sits behind the auth middleware and each
/// handler then requires `role = admin`, answering 403 for every other role.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /api/admin/ratings
        // Every rating joined with its user and store, newest first.
        .route("/ratings", get(handlers::get_admin_ratings))
        // GET /api/admin/users
        .route("/users", get(handlers::get_admin_users))
        // GET /api/admin/stores
        .route("/stores", get(handlers::get_admin_stores))
        // GET /api/admin/stats
        // Dashboard counters (users, stores, ratings).
        .route("/stats", get(handlers::get_admin_stats))
}
