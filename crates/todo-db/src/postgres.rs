use std::str::FromStr;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use crate::classify::fail;
use crate::query::{Dialect, Statement};
use crate::tx::{Sink, Transaction, TxInner};
use crate::{Database, DbConfig, DbError, TaskRow, UserRow};

#[derive(Clone)]
pub struct PostgresDatabase {
    read: PgPool,
    write: PgPool,
}

async fn pool(url: &str, max_connections: u32, config: &DbConfig) -> Result<PgPool, DbError> {
    // Connection strings carry credentials; keep them out of the log.
    let opts = PgConnectOptions::from_str(url).map_err(|e| fail("connect", "", e))?;
    PgPoolOptions::new()
        .max_connections(max_connections)
        .max_lifetime(config.max_lifetime)
        .connect_with(opts)
        .await
        .map_err(|e| fail("connect", "", e))
}

impl PostgresDatabase {
    /// Connect both pools. Read and write URLs may point at different hosts
    /// (primary and replica).
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        let write = pool(&config.write_url, config.write_max_connections, config).await?;
        let read = pool(&config.read_url, config.read_max_connections, config).await?;
        tracing::info!("postgres pools ready");
        Ok(Self { read, write })
    }

    pub async fn apply_schema(&self, script: &str) -> Result<(), DbError> {
        sqlx::raw_sql(script)
            .execute(&self.write)
            .await
            .map_err(|e| fail("apply_schema", script, e))?;
        Ok(())
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn begin(&self) -> Result<Transaction, sqlx::Error> {
        let tx = self.write.begin().await?;
        Ok(Transaction {
            inner: TxInner::Postgres(tx),
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
            Sink::Transaction(tx) => query.fetch_one(&mut **tx.as_postgres()?).await,
        }
    }

    async fn execute(&self, stmt: &Statement, sink: Sink<'_>) -> Result<u64, sqlx::Error> {
        let query = crate::bind_values!(sqlx::query(&stmt.sql), &stmt.args);
        let done = match sink {
            Sink::Pool => query.execute(&self.write).await?,
            Sink::Transaction(tx) => query.execute(&mut **tx.as_postgres()?).await?,
        };
        Ok(done.rows_affected())
    }
}
