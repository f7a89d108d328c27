use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

/// Lowest and highest accepted star values for a rating.
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

// --- Roles ---

/// Role
///
/// The RBAC field of a user. Stored as text in `users.role` and carried inside
/// every bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    Admin,
    User,
    StoreOwner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::StoreOwner => "store_owner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            "store_owner" => Ok(Role::StoreOwner),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

// Lets `#[sqlx(try_from = "String")]` decode the text column straight into a Role.
impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// --- Core Schemas (Mapped to Database) ---

/// User
///
/// A row of the `users` table as exposed to the admin user list and `/api/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
}

/// Rating
///
/// A single row of the `ratings` table. Returned after a user submits a rating.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Rating {
    pub id: i32,
    pub rating: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub user_id: i32,
    pub store_id: i32,
}

/// RatingRecord
///
/// A rating joined with the user who wrote it and the store it targets.
/// Only ratings whose user and store both exist can appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct RatingRecord {
    pub id: i32,
    pub rating: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub user_name: String,
    pub user_email: String,
    pub store_name: String,
}

/// StoreSummary
///
/// A store with its aggregated rating. `average_rating` is absent for a store
/// nobody has rated yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct StoreSummary {
    pub id: i32,
    pub name: String,
    pub owner_id: Option<i32>,
    pub average_rating: Option<f64>,
    pub rating_count: i64,
}

// --- Request Payloads ---

/// CreateRatingRequest
///
/// Input payload for `POST /api/stores/{id}/ratings`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateRatingRequest {
    #[schema(example = 4)]
    pub rating: i32,
}

impl CreateRatingRequest {
    pub fn is_valid(&self) -> bool {
        (MIN_RATING..=MAX_RATING).contains(&self.rating)
    }
}

// --- Response Envelopes ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RatingsResponse {
    pub ratings: Vec<RatingRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct StoresResponse {
    pub stores: Vec<StoreSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

/// AdminDashboardStats
///
/// Output schema for `GET /api/admin/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminDashboardStats {
    pub total_users: i64,
    pub total_stores: i64,
    pub total_ratings: i64,
}

/// MessageResponse
///
/// The body of every error response and of the database health check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
        }
    }
}
