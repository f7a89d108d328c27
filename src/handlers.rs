use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{
        AdminDashboardStats, CreateRatingRequest, MAX_RATING, MIN_RATING, MessageResponse, Rating,
        RatingsResponse, Role, StoresResponse, User, UsersResponse,
    },
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;

// --- Filter Structs ---

/// StoreFilter
///
/// Query parameters accepted by the store listings (`GET /api/stores`).
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StoreFilter {
    /// Optional case-insensitive substring of the store name.
    pub search: Option<String>,
}

// --- Handlers ---

/// get_admin_ratings
///
/// [Admin Route] Every rating with its author and store, most recent first.
///
/// *Authorization*: 401 without an `Authorization` header, 403 for an invalid
/// token or any role other than "admin". Query failures become a bare 500.
#[utoipa::path(
    get,
    path = "/api/admin/ratings",
    responses(
        (status = 200, description = "All ratings, newest first", body = RatingsResponse),
        (status = 401, description = "Missing Authorization header", body = MessageResponse),
        (status = 403, description = "Invalid token or not an admin", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
pub async fn get_admin_ratings(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<RatingsResponse>, ApiError> {
    user.require(Role::Admin)?;
    let ratings = state.repo.get_all_ratings().await?;
    Ok(Json(RatingsResponse { ratings }))
}

/// get_admin_users
///
/// [Admin Route] Lists every user for the user-management screen.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All users", body = UsersResponse),
        (status = 403, description = "Not an admin", body = MessageResponse)
    )
)]
pub async fn get_admin_users(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UsersResponse>, ApiError> {
    user.require(Role::Admin)?;
    let users = state.repo.list_users().await?;
    Ok(Json(UsersResponse { users }))
}

/// get_admin_stores
///
/// [Admin Route] Store management listing, including unrated stores.
#[utoipa::path(
    get,
    path = "/api/admin/stores",
    params(StoreFilter),
    responses(
        (status = 200, description = "All stores", body = StoresResponse),
        (status = 400, description = "Malformed query string", body = MessageResponse),
        (status = 403, description = "Not an admin", body = MessageResponse)
    )
)]
pub async fn get_admin_stores(
    user: AuthUser,
    State(state): State<AppState>,
    filter: Result<Query<StoreFilter>, QueryRejection>,
) -> Result<Json<StoresResponse>, ApiError> {
    user.require(Role::Admin)?;
    let Query(filter) = filter?;
    let stores = state.repo.list_stores(filter.search).await?;
    Ok(Json(StoresResponse { stores }))
}

/// get_admin_stats
///
/// [Admin Route] Dashboard counters.
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Stats", body = AdminDashboardStats),
        (status = 403, description = "Not an admin", body = MessageResponse)
    )
)]
pub async fn get_admin_stats(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<AdminDashboardStats>, ApiError> {
    user.require(Role::Admin)?;
    Ok(Json(state.repo.get_stats().await?))
}

/// get_owner_ratings
///
/// [Store Owner Route] Ratings left on the stores the caller owns, newest first.
#[utoipa::path(
    get,
    path = "/api/owner/ratings",
    responses(
        (status = 200, description = "Ratings of my stores", body = RatingsResponse),
        (status = 403, description = "Not a store owner", body = MessageResponse)
    )
)]
pub async fn get_owner_ratings(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<RatingsResponse>, ApiError> {
    user.require(Role::StoreOwner)?;
    let ratings = state.repo.get_owner_ratings(user.id).await?;
    Ok(Json(RatingsResponse { ratings }))
}

/// get_stores
///
/// [Authenticated Route] Store browsing for any signed-in role.
#[utoipa::path(
    get,
    path = "/api/stores",
    params(StoreFilter),
    responses(
        (status = 200, description = "Stores", body = StoresResponse),
        (status = 400, description = "Malformed query string", body = MessageResponse)
    )
)]
pub async fn get_stores(
    _user: AuthUser,
    State(state): State<AppState>,
    filter: Result<Query<StoreFilter>, QueryRejection>,
) -> Result<Json<StoresResponse>, ApiError> {
    let Query(filter) = filter?;
    let stores = state.repo.list_stores(filter.search).await?;
    Ok(Json(StoresResponse { stores }))
}

/// submit_rating
///
/// [User Route] Records a rating from the caller for a store.
///
/// *Validation*: the role is checked before the path and body are looked at, so
/// a non-user always gets 403. A malformed id or body, or a value outside 1..=5,
/// is a 400. A store that does not exist yields 404. Several ratings by the same
/// user for the same store are allowed.
#[utoipa::path(
    post,
    path = "/api/stores/{id}/ratings",
    params(("id" = i32, Path, description = "Store ID")),
    request_body = CreateRatingRequest,
    responses(
        (status = 201, description = "Created", body = Rating),
        (status = 400, description = "Malformed request or rating out of range", body = MessageResponse),
        (status = 403, description = "Not a user", body = MessageResponse),
        (status = 404, description = "Store not found", body = MessageResponse)
    )
)]
pub async fn submit_rating(
    user: AuthUser,
    State(state): State<AppState>,
    store_id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<CreateRatingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Rating>), ApiError> {
    user.require(Role::User)?;
    let Path(store_id) = store_id?;
    let Json(payload) = payload?;

    if !payload.is_valid() {
        return Err(ApiError::Validation {
            field: "rating",
            message: format!("rating must be between {} and {}", MIN_RATING, MAX_RATING),
        });
    }

    match state
        .repo
        .create_rating(user.id, store_id, payload.rating)
        .await?
    {
        Some(rating) => {
            tracing::info!(user_id = user.id, store_id, rating = rating.rating, "rating created");
            Ok((StatusCode::CREATED, Json(rating)))
        }
        None => Err(ApiError::NotFound("Store")),
    }
}

/// get_me
///
/// [Authenticated Route] The caller's profile as currently stored.
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Profile", body = User),
        (status = 404, description = "User no longer exists", body = MessageResponse)
    )
)]
pub async fn get_me(user: AuthUser, State(state): State<AppState>) -> Result<Json<User>, ApiError> {
    state
        .repo
        .get_user(user.id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("User"))
}

/// health_db
///
/// [Public Route] Database self-check: 200 when a pooled connection answers
/// `SELECT 1`, 503 otherwise.
#[utoipa::path(
    get,
    path = "/health/db",
    responses(
        (status = 200, description = "Database reachable", body = MessageResponse),
        (status = 503, description = "Database unavailable", body = MessageResponse)
    )
)]
pub async fn health_db(State(state): State<AppState>) -> Result<Json<MessageResponse>, ApiError> {
    match state.repo.ping().await {
        Ok(()) => Ok(Json(MessageResponse::new("ok"))),
        Err(e) => {
            tracing::warn!(error = %e, "database health check failed");
            Err(ApiError::Unavailable("Database"))
        }
    }
}
