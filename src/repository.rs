use async_trait::async_trait;
use sqlx::{Postgres, Row, query_builder::QueryBuilder};
use std::sync::Arc;

use crate::{
    db::{Database, DbError},
    models::{AdminDashboardStats, Rating, RatingRecord, StoreSummary, User},
};

/// Repository Trait
///
/// The contract for every persistence operation the handlers need. Handlers only
/// see `Arc<dyn Repository>`, so tests swap in an in-memory mock.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Ratings ---
    // Every rating joined to its user and store, newest first.
    async fn get_all_ratings(&self) -> Result<Vec<RatingRecord>, DbError>;
    // Same shape, limited to stores owned by `owner_id`, newest first.
    async fn get_owner_ratings(&self, owner_id: i32) -> Result<Vec<RatingRecord>, DbError>;
    // None when the store does not exist.
    async fn create_rating(
        &self,
        user_id: i32,
        store_id: i32,
        value: i32,
    ) -> Result<Option<Rating>, DbError>;

    // --- Users & Stores ---
    async fn get_user(&self, id: i32) -> Result<Option<User>, DbError>;
    async fn list_users(&self) -> Result<Vec<User>, DbError>;
    async fn list_stores(&self, search: Option<String>) -> Result<Vec<StoreSummary>, DbError>;

    // --- Admin & Diagnostics ---
    async fn get_stats(&self) -> Result<AdminDashboardStats, DbError>;
    async fn ping(&self) -> Result<(), DbError>;
}

pub type RepositoryState = Arc<dyn Repository>;

const RATING_RECORD_SELECT: &str = r#"
    SELECT
        r.id, r.rating, r.created_at,
        u.name AS user_name, u.email AS user_email,
        s.name AS store_name
    FROM ratings r
    JOIN users u ON r.user_id = u.id
    JOIN stores s ON r.store_id = s.id
"#;

/// Builds an `ILIKE` pattern matching `term` as a literal substring. `\`, `%`
/// and `_` are escaped with the default `LIKE` escape character.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// PostgresRepository
///
/// The `Repository` backed by the shared Postgres pool.
pub struct PostgresRepository {
    db: Database,
}

impl PostgresRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// get_all_ratings
    ///
    /// The admin listing. Inner joins drop ratings whose user or store is gone.
    async fn get_all_ratings(&self) -> Result<Vec<RatingRecord>, DbError> {
        let query = format!("{RATING_RECORD_SELECT} ORDER BY r.created_at DESC");
        let ratings = sqlx::query_as::<_, RatingRecord>(&query)
            .fetch_all(self.db.pool())
            .await?;
        Ok(ratings)
    }

    async fn get_owner_ratings(&self, owner_id: i32) -> Result<Vec<RatingRecord>, DbError> {
        let query =
            format!("{RATING_RECORD_SELECT} WHERE s.owner_id = $1 ORDER BY r.created_at DESC");
        let ratings = sqlx::query_as::<_, RatingRecord>(&query)
            .bind(owner_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(ratings)
    }

    /// create_rating
    ///
    /// Inserts through `SELECT ... FROM stores` so a missing store inserts nothing
    /// and yields `None` instead of a foreign-key error.
    async fn create_rating(
        &self,
        user_id: i32,
        store_id: i32,
        value: i32,
    ) -> Result<Option<Rating>, DbError> {
        let rating = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (rating, user_id, store_id, created_at)
            SELECT $1, $2, s.id, NOW() FROM stores s WHERE s.id = $3
            RETURNING id, rating, created_at, user_id, store_id
            "#,
        )
        .bind(value)
        .bind(user_id)
        .bind(store_id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(rating)
    }

    async fn get_user(&self, id: i32) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>("SELECT id, name, email, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, DbError> {
        let users =
            sqlx::query_as::<_, User>("SELECT id, name, email, role FROM users ORDER BY name ASC")
                .fetch_all(self.db.pool())
                .await?;
        Ok(users)
    }

    /// list_stores
    ///
    /// Store summaries with their average rating. The optional search is a
    /// case-insensitive substring match on the name, always bound as a parameter.
    async fn list_stores(&self, search: Option<String>) -> Result<Vec<StoreSummary>, DbError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT
                s.id, s.name, s.owner_id,
                AVG(r.rating)::float8 AS average_rating,
                COUNT(r.id) AS rating_count
            FROM stores s
            LEFT JOIN ratings r ON r.store_id = s.id
            "#,
        );

        if let Some(s) = search.filter(|s| !s.trim().is_empty()) {
            builder.push(" WHERE s.name ILIKE ");
            builder.push_bind(contains_pattern(s.trim()));
        }

        builder.push(" GROUP BY s.id ORDER BY s.name ASC");

        let stores = builder
            .build_query_as::<StoreSummary>()
            .fetch_all(self.db.pool())
            .await?;
        Ok(stores)
    }

    /// get_stats
    ///
    /// All dashboard counters in one round trip.
    async fn get_stats(&self) -> Result<AdminDashboardStats, DbError> {
        let rows = self
            .db
            .query(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM users) AS total_users,
                    (SELECT COUNT(*) FROM stores) AS total_stores,
                    (SELECT COUNT(*) FROM ratings) AS total_ratings
                "#,
                &[],
            )
            .await?;

        let Some(row) = rows.first() else {
            return Ok(AdminDashboardStats::default());
        };

        Ok(AdminDashboardStats {
            total_users: row.try_get("total_users")?,
            total_stores: row.try_get("total_stores")?,
            total_ratings: row.try_get("total_ratings")?,
        })
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.db.ping().await
    }
}
