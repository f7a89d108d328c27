#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::{Arc, Mutex};
use store_ratings::{
    AppState, TokenPayload,
    config::AppConfig,
    db::DbError,
    models::{AdminDashboardStats, Rating, RatingRecord, Role, StoreSummary, User},
    repository::Repository,
};

pub const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

// --- Mock Repository ---

/// In-memory stand-in for `PostgresRepository`. Returns canned rows, or a
/// database error from every method when `fail` is set.
#[derive(Default)]
pub struct MockRepo {
    pub ratings: Vec<RatingRecord>,
    pub owner_ratings: Vec<RatingRecord>,
    pub users: Vec<User>,
    pub stores: Vec<StoreSummary>,
    pub stats: AdminDashboardStats,
    pub fail: bool,
    // Recorded inputs so tests can check what the handler passed down.
    pub owner_queried: Mutex<Option<i32>>,
    pub search_queried: Mutex<Option<String>>,
    pub created: Mutex<Vec<(i32, i32, i32)>>,
}

impl MockRepo {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), DbError> {
        if self.fail {
            // Carries SQL text so tests can prove it never reaches a response body.
            return Err(DbError::Sqlx(sqlx::Error::Protocol(
                "relation \"ratings\" does not exist: SELECT r.id FROM ratings r".to_string(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for MockRepo {
    async fn get_all_ratings(&self) -> Result<Vec<RatingRecord>, DbError> {
        self.check()?;
        Ok(self.ratings.clone())
    }

    async fn get_owner_ratings(&self, owner_id: i32) -> Result<Vec<RatingRecord>, DbError> {
        self.check()?;
        *self.owner_queried.lock().unwrap() = Some(owner_id);
        Ok(self.owner_ratings.clone())
    }

    async fn create_rating(
        &self,
        user_id: i32,
        store_id: i32,
        value: i32,
    ) -> Result<Option<Rating>, DbError> {
        self.check()?;
        if !self.stores.iter().any(|s| s.id == store_id) {
            return Ok(None);
        }
        self.created.lock().unwrap().push((user_id, store_id, value));
        Ok(Some(Rating {
            id: 99,
            rating: value,
            created_at: at(1_700_000_000),
            user_id,
            store_id,
        }))
    }

    async fn get_user(&self, id: i32) -> Result<Option<User>, DbError> {
        self.check()?;
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, DbError> {
        self.check()?;
        Ok(self.users.clone())
    }

    async fn list_stores(&self, search: Option<String>) -> Result<Vec<StoreSummary>, DbError> {
        self.check()?;
        *self.search_queried.lock().unwrap() = search;
        Ok(self.stores.clone())
    }

    async fn get_stats(&self) -> Result<AdminDashboardStats, DbError> {
        self.check()?;
        Ok(self.stats.clone())
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.check()
    }
}

// --- State & Token Helpers ---

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    }
}

pub fn create_test_state(repo: MockRepo) -> AppState {
    AppState::new(Arc::new(repo), &test_config())
}

/// Like `create_test_state`, but keeps a handle on the mock to inspect recorded inputs.
pub fn create_shared_state(repo: MockRepo) -> (Arc<MockRepo>, AppState) {
    let repo = Arc::new(repo);
    let state = AppState::new(repo.clone(), &test_config());
    (repo, state)
}

pub fn token_for(state: &AppState, id: i32, email: &str, role: Role) -> String {
    state
        .tokens
        .issue(&TokenPayload {
            id,
            email: email.to_string(),
            role,
        })
        .unwrap()
}

// --- Fixtures ---

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

pub fn rating_record(id: i32, rating: i32, created_at: DateTime<Utc>) -> RatingRecord {
    RatingRecord {
        id,
        rating,
        created_at,
        user_name: format!("User {}", id),
        user_email: format!("user{}@x.com", id),
        store_name: "Corner Shop".to_string(),
    }
}

pub fn store(id: i32, name: &str) -> StoreSummary {
    StoreSummary {
        id,
        name: name.to_string(),
        owner_id: Some(3),
        average_rating: Some(4.5),
        rating_count: 2,
    }
}

pub fn user(id: i32, name: &str, role: Role) -> User {
    User {
        id,
        name: name.to_string(),
        email: format!("{}@x.com", name.to_lowercase()),
        role,
    }
}
