use crate::classify::fail;
use crate::DbError;

pub(crate) enum TxInner {
    #[cfg(feature = "sqlite")]
    Sqlite(sqlx::Transaction<'static, sqlx::Sqlite>),
    #[cfg(feature = "postgres")]
    Postgres(sqlx::Transaction<'static, sqlx::Postgres>),
}

/// An open write transaction on the write pool.
///
/// Finish it with [`commit`](Self::commit) or [`rollback`](Self::rollback).
/// Dropping it unfinished rolls back and returns the connection to the pool.
pub struct Transaction {
    pub(crate) inner: TxInner,
}

impl Transaction {
    pub async fn commit(self) -> Result<(), DbError> {
        let res: Result<(), sqlx::Error> = match self.inner {
            #[cfg(feature = "sqlite")]
            TxInner::Sqlite(tx) => tx.commit().await,
            #[cfg(feature = "postgres")]
            TxInner::Postgres(tx) => tx.commit().await,
        };
        res.map_err(|e| fail("commit", "COMMIT", e))
    }

    pub async fn rollback(self) -> Result<(), DbError> {
        let res: Result<(), sqlx::Error> = match self.inner {
            #[cfg(feature = "sqlite")]
            TxInner::Sqlite(tx) => tx.rollback().await,
            #[cfg(feature = "postgres")]
            TxInner::Postgres(tx) => tx.rollback().await,
        };
        res.map_err(|e| fail("rollback", "ROLLBACK", e))
    }

    #[cfg(feature = "sqlite")]
    pub(crate) fn as_sqlite(
        &mut self,
    ) -> Result<&mut sqlx::Transaction<'static, sqlx::Sqlite>, sqlx::Error> {
        match &mut self.inner {
            TxInner::Sqlite(tx) => Ok(tx),
            #[allow(unreachable_patterns)]
            _ => Err(foreign_transaction()),
        }
    }

    #[cfg(feature = "postgres")]
    pub(crate) fn as_postgres(
        &mut self,
    ) -> Result<&mut sqlx::Transaction<'static, sqlx::Postgres>, sqlx::Error> {
        match &mut self.inner {
            TxInner::Postgres(tx) => Ok(tx),
            #[allow(unreachable_patterns)]
            _ => Err(foreign_transaction()),
        }
    }
}

#[allow(dead_code)]
fn foreign_transaction() -> sqlx::Error {
    sqlx::Error::Configuration("transaction was opened on a different backend".into())
}

/// Where a write goes: the default write pool, or an open transaction.
pub enum Sink<'a> {
    Pool,
    Transaction(&'a mut Transaction),
}

impl<'a> From<Option<&'a mut Transaction>> for Sink<'a> {
    fn from(tx: Option<&'a mut Transaction>) -> Self {
        match tx {
            Some(tx) => Sink::Transaction(tx),
            None => Sink::Pool,
        }
    }
}
