use std::sync::Arc;

use async_trait::async_trait;

use todo_core::user::User;

use crate::classify::fail;
use crate::query::Select;
use crate::{Database, DbError, UserRow};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_many_users(&self) -> Result<Vec<User>, DbError>;
}

pub struct SqlUserRepository {
    db: Arc<dyn Database>,
    table: String,
}

impl SqlUserRepository {
    pub fn new(db: Arc<dyn Database>, table: impl Into<String>) -> Self {
        Self {
            db,
            table: table.into(),
        }
    }
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            uuid: r.uuid,
            name: r.name,
            email: r.email,
            created_at: r.created_at,
        }
    }
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn find_many_users(&self) -> Result<Vec<User>, DbError> {
        let stmt = Select::new(&self.table, &["uuid", "name", "email", "created_at"])
            .build(self.db.dialect());
        let rows = self
            .db
            .fetch_users(&stmt)
            .await
            .map_err(|e| fail("find_many_users", &stmt.sql, e))?;
        Ok(rows.into_iter().map(User::from).collect())
    }
}
