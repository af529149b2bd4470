use std::sync::Arc;

use chrono_tz::Tz;

use todo_core::user::UserView;
use todo_db::UserRepository;

use crate::tasks::logged;
use crate::ServiceError;

pub struct UserService {
    repo: Arc<dyn UserRepository>,
    tz: Tz,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, tz: Tz) -> Self {
        Self { repo, tz }
    }

    pub async fn list_users(&self) -> Result<Vec<UserView>, ServiceError> {
        let users = self
            .repo
            .find_many_users()
            .await
            .map_err(|e| logged("list_users", e))?;
        Ok(users
            .into_iter()
            .map(|u| UserView {
                uuid: u.uuid,
                name: u.name,
                email: u.email,
                created_at: u.created_at.with_timezone(&self.tz).fixed_offset(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use todo_core::user::User;
    use todo_db::DbError;

    struct FixedUsers(Result<Vec<User>, ()>);

    #[async_trait]
    impl UserRepository for FixedUsers {
        async fn find_many_users(&self) -> Result<Vec<User>, DbError> {
            self.0.clone().map_err(|_| DbError::Internal)
        }
    }

    #[tokio::test]
    async fn lists_users_in_configured_zone() {
        let repo = FixedUsers(Ok(vec![User {
            uuid: "0b7e".into(),
            name: "Ayu".into(),
            email: "ayu@example.com".into(),
            created_at: Utc.with_ymd_and_hms(2023, 12, 31, 20, 0, 0).unwrap(),
        }]));
        let svc = UserService::new(Arc::new(repo), chrono_tz::Asia::Jakarta);
        let users = svc.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "ayu@example.com");
        assert_eq!(users[0].created_at.to_rfc3339(), "2024-01-01T03:00:00+07:00");
    }

    #[tokio::test]
    async fn empty_listing_is_success() {
        let svc = UserService::new(Arc::new(FixedUsers(Ok(vec![]))), chrono_tz::UTC);
        assert!(svc.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failures_are_internal() {
        let svc = UserService::new(Arc::new(FixedUsers(Err(()))), chrono_tz::UTC);
        let err = svc.list_users().await.unwrap_err();
        assert_eq!(err.status(), 500);
    }
}
