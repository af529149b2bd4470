pub mod classify;
pub mod query;
mod tasks;
mod tx;
mod users;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use classify::classify;
pub use query::{Dialect, Statement, Value};
pub use tasks::{SqlTaskRepository, TaskRepository};
pub use tx::{Sink, Transaction};
pub use users::{SqlUserRepository, UserRepository};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

/// Reference DDL, shipped for operators and tests. Nothing applies it at
/// runtime.
pub mod schema {
    pub const SQLITE: &str = include_str!("../schema/sqlite.sql");
    pub const POSTGRES: &str = include_str!("../schema/postgres.sql");
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("internal database error")]
    Internal,

    #[error("unsupported database url: {0}")]
    UnsupportedUrl(String),
}

/// Connection settings shared by both backends.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub read_url: String,
    pub write_url: String,
    pub read_max_connections: u32,
    pub write_max_connections: u32,
    pub max_lifetime: Duration,
    pub task_table: String,
    pub user_table: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            read_url: "sqlite://todo.db".into(),
            write_url: "sqlite://todo.db".into(),
            read_max_connections: 10,
            write_max_connections: 10,
            max_lifetime: Duration::from_secs(180),
            task_table: "task".into(),
            user_table: "user_encrypt".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TaskRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: Option<i16>,
    pub attachment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct UserRow {
    pub uuid: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Statement execution over a read pool and a write pool.
///
/// Methods return the raw driver error; repositories classify it.
#[async_trait]
pub trait Database: Send + Sync {
    fn dialect(&self) -> Dialect;

    async fn begin(&self) -> Result<Transaction, sqlx::Error>;

    /// Read pool.
    async fn fetch_tasks(&self, stmt: &Statement) -> Result<Vec<TaskRow>, sqlx::Error>;

    /// Read pool.
    async fn fetch_users(&self, stmt: &Statement) -> Result<Vec<UserRow>, sqlx::Error>;

    /// Runs an `INSERT ... RETURNING` and yields the returned id.
    async fn insert(&self, stmt: &Statement, sink: Sink<'_>) -> Result<i64, sqlx::Error>;

    /// Returns the number of affected rows.
    async fn execute(&self, stmt: &Statement, sink: Sink<'_>) -> Result<u64, sqlx::Error>;
}

/// Open the backend named by the write URL's scheme.
pub async fn open(config: &DbConfig) -> Result<Arc<dyn Database>, DbError> {
    let url = config.write_url.as_str();
    #[cfg(feature = "sqlite")]
    if url.starts_with("sqlite:") {
        return Ok(Arc::new(sqlite::SqliteDatabase::connect(config).await?));
    }
    #[cfg(feature = "postgres")]
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        return Ok(Arc::new(postgres::PostgresDatabase::connect(config).await?));
    }
    Err(DbError::UnsupportedUrl(scheme_of(url).to_string()))
}

fn scheme_of(url: &str) -> &str {
    url.split_once(':').map(|(s, _)| s).unwrap_or(url)
}

/// Bind every [`Value`] of a statement onto a sqlx query, in order.
macro_rules! bind_values {
    ($query:expr, $args:expr) => {{
        let mut q = $query;
        for arg in $args {
            q = match arg {
                $crate::Value::Int(v) => q.bind(*v),
                $crate::Value::Text(v) => q.bind(v.clone()),
                $crate::Value::SmallInt(v) => q.bind(*v),
                $crate::Value::Timestamp(v) => q.bind(*v),
            };
        }
        q
    }};
}
#[allow(unused_imports)]
pub(crate) use bind_values;
