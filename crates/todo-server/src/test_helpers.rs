use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;
use todo_db::{schema, Database, DbConfig, SqlTaskRepository, SqlUserRepository, SqliteDatabase};
use todo_service::{AttachmentPolicy, TaskService, UserService};
use todo_store::{LocalStore, StoreConfig};

use crate::auth::BasicAuth;
use crate::routes::{build_router, AppState, InnerAppState};

/// Keeps the temp database and store alive for the duration of a test.
pub struct TestContext {
    _db_dir: TempDir,
    store_dir: TempDir,
    pub db: Arc<SqliteDatabase>,
    pub state: AppState,
}

impl TestContext {
    /// Root of the local attachment store, laid out as `<bucket>/<key>`.
    pub fn store_dir(&self) -> PathBuf {
        self.store_dir.path().to_path_buf()
    }

    /// Insert a user row directly; the API has no way to create users.
    pub async fn seed_user(&self, uuid: &str, name: &str, email: &str, created_at: &str) {
        let sql = format!(
            "INSERT INTO user_encrypt (uuid, name, email, created_at) \
             VALUES ('{uuid}', '{name}', '{email}', '{created_at}')"
        );
        self.db.apply_schema(&sql).await.unwrap();
    }
}

async fn build(auth: Option<BasicAuth>, allowed_origins: Vec<String>) -> (Router, TestContext) {
    let db_dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", db_dir.path().join("todo.db").display());
    let config = DbConfig {
        read_url: url.clone(),
        write_url: url,
        read_max_connections: 4,
        write_max_connections: 1,
        ..Default::default()
    };
    let db = Arc::new(SqliteDatabase::connect(&config).await.unwrap());
    db.apply_schema(schema::SQLITE).await.unwrap();
    let dyn_db: Arc<dyn Database> = db.clone();

    let store_dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(&StoreConfig {
        local_data_dir: Some(store_dir.path().to_string_lossy().to_string()),
        ..Default::default()
    });

    let tz = chrono_tz::Asia::Jakarta;
    let state = Arc::new(InnerAppState {
        tasks: TaskService::new(
            Arc::new(SqlTaskRepository::new(dyn_db.clone(), config.task_table.clone())),
            Arc::new(store),
            Arc::new(mockable::DefaultClock),
            tz,
            AttachmentPolicy::default(),
        ),
        users: UserService::new(
            Arc::new(SqlUserRepository::new(dyn_db, config.user_table.clone())),
            tz,
        ),
        auth: auth.map(Arc::new),
        allowed_origins,
    });

    let router = build_router(state.clone());
    (
        router,
        TestContext {
            _db_dir: db_dir,
            store_dir,
            db,
            state,
        },
    )
}

/// Router over a temp SQLite file and a temp local store, no auth.
pub async fn test_router() -> (Router, TestContext) {
    build(None, Vec::new()).await
}

/// Same as `test_router` with basic auth enabled. Returns the credentials.
pub async fn test_router_with_auth() -> (Router, TestContext, (String, String)) {
    let user = "tester".to_string();
    let pass = "correct horse".to_string();
    let (router, ctx) = build(Some(BasicAuth::new(&user, &pass)), Vec::new()).await;
    (router, ctx, (user, pass))
}

pub async fn test_router_with_origins(origins: Vec<String>) -> (Router, TestContext) {
    build(None, origins).await
}
