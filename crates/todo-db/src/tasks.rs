use std::sync::Arc;

use async_trait::async_trait;

use todo_core::task::{NewTask, Task, TaskChanges, TaskFilter, TaskStatus};

use crate::classify::fail;
use crate::query::{Insert, Op, Select, Update, Value};
use crate::tx::{Sink, Transaction};
use crate::{Database, DbError, TaskRow};

const COLUMNS: &[&str] = &[
    "id",
    "name",
    "description",
    "status",
    "attachment",
    "created_at",
    "updated_at",
];

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Open a write transaction on the write pool.
    async fn begin(&self) -> Result<Transaction, DbError>;

    /// All tasks matching the filter. Absent predicates add nothing; no
    /// match is an empty vec.
    async fn find_many(&self, filter: &TaskFilter) -> Result<Vec<Task>, DbError>;

    /// If the id matches several rows the last one in result order wins.
    async fn find_one_by_id(&self, id: i64) -> Result<Task, DbError>;

    /// Insert and return the store-assigned id. Without a transaction the
    /// insert auto-commits.
    async fn save(&self, task: &NewTask, tx: Option<&mut Transaction>) -> Result<i64, DbError>;

    /// Overwrite the mutable columns. Zero affected rows is not an error.
    async fn update_by_id(
        &self,
        id: i64,
        changes: &TaskChanges,
        tx: Option<&mut Transaction>,
    ) -> Result<(), DbError>;
}

pub struct SqlTaskRepository {
    db: Arc<dyn Database>,
    table: String,
}

impl SqlTaskRepository {
    pub fn new(db: Arc<dyn Database>, table: impl Into<String>) -> Self {
        Self {
            db,
            table: table.into(),
        }
    }
}

impl From<TaskRow> for Task {
    fn from(r: TaskRow) -> Self {
        let status = r.status.and_then(|code| {
            let status = TaskStatus::from_code(code);
            if status.is_none() {
                tracing::warn!(id = r.id, code, "unknown task status code");
            }
            status
        });
        Task {
            id: r.id,
            name: r.name,
            description: r.description,
            status,
            attachment: r.attachment,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

fn status_value(status: Option<TaskStatus>) -> Value {
    Value::SmallInt(status.map(|s| s.code()))
}

pub(crate) fn pick_last<T>(rows: Vec<T>) -> Option<T> {
    rows.into_iter().last()
}

#[async_trait]
impl TaskRepository for SqlTaskRepository {
    async fn begin(&self) -> Result<Transaction, DbError> {
        self.db.begin().await.map_err(|e| fail("begin", "BEGIN", e))
    }

    async fn find_many(&self, filter: &TaskFilter) -> Result<Vec<Task>, DbError> {
        let stmt = Select::new(&self.table, COLUMNS)
            .filter_opt("name", Op::Eq, filter.name.clone())
            .build(self.db.dialect());
        let rows = self
            .db
            .fetch_tasks(&stmt)
            .await
            .map_err(|e| fail("find_many", &stmt.sql, e))?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn find_one_by_id(&self, id: i64) -> Result<Task, DbError> {
        let stmt = Select::new(&self.table, COLUMNS)
            .filter("id", Op::Eq, id)
            .build(self.db.dialect());
        let rows = self
            .db
            .fetch_tasks(&stmt)
            .await
            .map_err(|e| fail("find_one_by_id", &stmt.sql, e))?;
        pick_last(rows).map(Task::from).ok_or(DbError::NotFound)
    }

    async fn save(&self, task: &NewTask, tx: Option<&mut Transaction>) -> Result<i64, DbError> {
        let stmt = Insert::new(&self.table)
            .value("name", task.name.as_str())
            .value("description", task.description.clone())
            .value("status", status_value(Some(task.status)))
            .value("created_at", task.created_at)
            .returning("id")
            .build(self.db.dialect());
        self.db
            .insert(&stmt, Sink::from(tx))
            .await
            .map_err(|e| fail("save", &stmt.sql, e))
    }

    async fn update_by_id(
        &self,
        id: i64,
        changes: &TaskChanges,
        tx: Option<&mut Transaction>,
    ) -> Result<(), DbError> {
        let stmt = Update::new(&self.table)
            .set("name", changes.name.as_str())
            .set("description", changes.description.clone())
            .set("status", status_value(changes.status))
            .set("attachment", changes.attachment.clone())
            .set("updated_at", changes.updated_at)
            .filter("id", Op::Eq, id)
            .build(self.db.dialect());
        let affected = self
            .db
            .execute(&stmt, Sink::from(tx))
            .await
            .map_err(|e| fail("update_by_id", &stmt.sql, e))?;
        tracing::debug!(id, affected, "task updated");
        Ok(())
    }
}
