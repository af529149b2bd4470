use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use todo_db::{SqlTaskRepository, SqlUserRepository};
use todo_server::config::ServerConfig;
use todo_server::InnerAppState;
use todo_service::{TaskService, UserService};
use todo_store::StoreConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();

    let db = todo_db::open(&config.db_config())
        .await
        .context("opening database")?;
    let tasks_repo = Arc::new(SqlTaskRepository::new(db.clone(), config.task_table.clone()));
    let users_repo = Arc::new(SqlUserRepository::new(db, config.user_table.clone()));

    let store = todo_store::create_store(&StoreConfig::from_env())
        .context("creating attachment store")?;

    let auth = config.basic_auth().map(Arc::new);
    if auth.is_some() {
        tracing::info!("basic authentication enabled");
    } else {
        tracing::warn!("basic authentication disabled (no credentials configured)");
    }

    let state = Arc::new(InnerAppState {
        tasks: TaskService::new(
            tasks_repo,
            store,
            Arc::new(mockable::DefaultClock),
            config.timezone,
            config.attachment_policy(),
        ),
        users: UserService::new(users_repo, config.timezone),
        auth,
        allowed_origins: config.allowed_origins.clone(),
    });

    let addr = config.addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "todo-server listening");

    todo_server::serve(listener, state, shutdown_signal()).await?;
    tracing::info!("todo-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received, draining connections");
}
