use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions, PgRow},
};
use std::str::FromStr;
use thiserror::Error;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("invalid database URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// SqlParam
///
/// A positional parameter for `Database::query`, bound in order to `$1`, `$2`, ...
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
    Bool(bool),
}

/// Database
///
/// Shared handle to the Postgres pool. Cloning is cheap; every clone checks
/// connections out of the same pool.
#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Builds the pool without opening a connection. The first query connects.
    pub fn connect_lazy(config: &AppConfig) -> Result<Self, DbError> {
        let mut options = PgConnectOptions::from_str(&config.db_url)
            .map_err(|e| DbError::InvalidUrl(e.to_string()))?;
        if let Some(mode) = config.db_ssl_mode {
            options = options.ssl_mode(mode);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect_lazy_with(options);

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs `sql` with positional parameters and returns every row.
    pub async fn query<'q>(
        &self,
        sql: &'q str,
        params: &'q [SqlParam],
    ) -> Result<Vec<PgRow>, DbError> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = match param {
                SqlParam::Int(v) => query.bind(*v),
                SqlParam::Text(v) => query.bind(v.as_str()),
                SqlParam::Bool(v) => query.bind(*v),
            };
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    /// ping
    ///
    /// Liveness self-check: checks out one connection, runs `SELECT 1` on it and
    /// hands it back to the pool when `conn` goes out of scope, on success or error.
    pub async fn ping(&self) -> Result<(), DbError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("SELECT 1").execute(&mut *conn).await?;
        Ok(())
    }

    /// Waits for checked-out connections to return, then closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
