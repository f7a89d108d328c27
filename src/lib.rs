use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

// Routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use auth::{TokenCodec, TokenPayload, TokenState};
pub use config::AppConfig;
pub use db::Database;
pub use error::ApiError;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document aggregated from the `#[utoipa::path]` handlers and the
/// `ToSchema` models. Served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_admin_ratings, handlers::get_admin_users, handlers::get_admin_stores,
        handlers::get_admin_stats, handlers::get_owner_ratings, handlers::get_stores,
        handlers::submit_rating, handlers::get_me, handlers::health_db
    ),
    components(
        schemas(
            models::Role, models::User, models::Rating, models::RatingRecord,
            models::StoreSummary, models::CreateRatingRequest, models::RatingsResponse,
            models::StoresResponse, models::UsersResponse, models::AdminDashboardStats,
            models::MessageResponse,
        )
    ),
    tags(
        (name = "store-ratings", description = "Store Ratings API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The application context shared by every request: persistence and the token
/// codec. Built once at start-up.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub tokens: TokenState,
}

impl AppState {
    /// Assembles the state, deriving the token codec from `config.jwt_secret`.
    pub fn new(repo: RepositoryState, config: &AppConfig) -> Self {
        let tokens = Arc::new(TokenCodec::new(&config.jwt_secret));
        Self { repo, tokens }
    }
}

// The auth extractor only needs the codec.
impl FromRef<AppState> for TokenState {
    fn from_ref(app_state: &AppState) -> TokenState {
        app_state.tokens.clone()
    }
}

/// auth_middleware
///
/// Guards every `/api` route. Extracting `AuthUser` rejects the request with 401
/// (no header) or 403 (bad token) before any handler or query runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing tree, applies the scoped auth middleware and the global
/// observability layers, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // Everything under /api requires a verified token.
    let api_router = Router::new()
        .merge(authenticated::authenticated_routes())
        .nest("/admin", admin::admin_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .nest("/api", api_router)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span carrying the `x-request-id`, so every log line of
/// one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
