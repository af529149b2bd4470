use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::classify::fail;
use crate::query::{Dialect, Statement};
use crate::tx::{Sink, Transaction, TxInner};
use crate::{Database, DbConfig, DbError, TaskRow, UserRow};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite backend. The read pool opens the file read-only; the write pool
/// creates it if missing and runs in WAL mode.
#[derive(Clone)]
pub struct SqliteDatabase {
    read: SqlitePool,
    write: SqlitePool,
}

impl SqliteDatabase {
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        let write_opts = SqliteConnectOptions::from_str(&config.write_url)
            .map_err(|e| fail("connect", &config.write_url, e))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let write = SqlitePoolOptions::new()
            .max_connections(config.write_max_connections)
            .max_lifetime(config.max_lifetime)
            .connect_with(write_opts)
            .await
            .map_err(|e| fail("connect", &config.write_url, e))?;

        // Opened after the writer so the file and its WAL exist.
        let read_opts = SqliteConnectOptions::from_str(&config.read_url)
            .map_err(|e| fail("connect", &config.read_url, e))?
            .read_only(true)
            .busy_timeout(BUSY_TIMEOUT);
        let read = SqlitePoolOptions::new()
            .max_connections(config.read_max_connections)
            .max_lifetime(config.max_lifetime)
            .connect_with(read_opts)
            .await
            .map_err(|e| fail("connect", &config.read_url, e))?;

        tracing::info!(url = %config.write_url, "sqlite pools ready");
        Ok(Self { read, write })
    }

    /// Run a DDL script on the write pool.
    pub async fn apply_schema(&self, script: &str) -> Result<(), DbError> {
        sqlx::raw_sql(script)
            .execute(&self.write)
            .await
            .map_err(|e| fail("apply_schema", script, e))?;
        Ok(())
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn begin(&self) -> Result<Transaction, sqlx::Error> {
        let tx = self.write.begin().await?;
        Ok(Transaction {
            inner: TxInner::Sqlite(tx),
        })
    }

    async fn fetch_tasks(&self, stmt: &Statement) -> Result<Vec<TaskRow>, sqlx::Error> {
        let query = crate::bind_values!(sqlx::query_as::<_, TaskRow>(&stmt.sql), &stmt.args);
        query.fetch_all(&self.read).await
    }

    async fn fetch_users(&self, stmt: &Statement) -> Result<Vec<UserRow>, sqlx::Error> {
        let query = crate::bind_values!(sqlx::query_as::<_, UserRow>(&stmt.sql), &stmt.args);
        query.fetch_all(&self.read).await
    }

    async fn insert(&self, stmt: &Statement, sink: Sink<'_>) -> Result<i64, sqlx::Error> {
        let query = crate::bind_values!(sqlx::query_scalar::<_, i64>(&stmt.sql), &stmt.args);
        match sink {
            Sink::Pool => query.fetch_one(&self.write).await,
            Sink::Transaction(tx) => query.fetch_one(&mut **tx.as_sqlite()?).await,
        }
    }

    async fn execute(&self, stmt: &Statement, sink: Sink<'_>) -> Result<u64, sqlx::Error> {
        let query = crate::bind_values!(sqlx::query(&stmt.sql), &stmt.args);
        let done = match sink {
            Sink::Pool => query.execute(&self.write).await?,
            Sink::Transaction(tx) => query.execute(&mut **tx.as_sqlite()?).await?,
        };
        Ok(done.rows_affected())
    }
}
