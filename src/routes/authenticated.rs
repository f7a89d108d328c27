use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Mounted under `/api`. Every route here sits behind the auth middleware, so a
/// request without a valid bearer token never reaches a handler. Handlers that
/// serve a single role (`user`, `store_owner`) check it themselves.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/me
        // The caller's stored profile.
        .route("/me", get(handlers::get_me))
        // GET /api/stores?search=...
        // Store browsing with average ratings.
        .route("/stores", get(handlers::get_stores))
        // POST /api/stores/{id}/ratings
        // Role 'user' only. Value must be 1..=5.
        .route("/stores/{id}/ratings", post(handlers::submit_rating))
        // GET /api/owner/ratings
        // Role 'store_owner' only. Ratings left on the caller's stores.
        .route("/owner/ratings", get(handlers::get_owner_ratings))
}
