// Backend-agnostic assertions for the repositories.
//
// Each public async function accepts trait objects so the same logic runs
// against both the SQLite and Postgres backends.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use todo_core::task::{NewTask, TaskChanges, TaskFilter, TaskStatus};
use todo_db::{DbError, TaskRepository, UserRepository};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, h, m, 0).unwrap()
}

pub fn new_task(name: &str) -> NewTask {
    NewTask {
        name: name.to_string(),
        description: Some(format!("{name} description")),
        status: TaskStatus::Initiated,
        created_at: at(9, 0),
    }
}

fn changes(name: &str) -> TaskChanges {
    TaskChanges {
        name: name.to_string(),
        description: None,
        status: Some(TaskStatus::Done),
        attachment: Some("https://storage.googleapis.com/image-wreg/wr/todo_attachment/x.png".into()),
        updated_at: at(10, 0),
    }
}

// ---------------------------------------------------------------------------
// Task tests
// ---------------------------------------------------------------------------

/// Save without a transaction, then read it back.
pub async fn test_save_and_find(repo: &dyn TaskRepository) {
    let id = repo.save(&new_task("write report"), None).await.unwrap();
    assert!(id > 0);

    let task = repo.find_one_by_id(id).await.unwrap();
    assert_eq!(task.id, id);
    assert_eq!(task.name, "write report");
    assert_eq!(task.description.as_deref(), Some("write report description"));
    assert_eq!(task.status, Some(TaskStatus::Initiated));
    assert_eq!(task.attachment, None);
    assert_eq!(task.created_at, at(9, 0));
    assert_eq!(task.updated_at, None);

    let second = repo.save(&new_task("second"), None).await.unwrap();
    assert_ne!(second, id);
}

pub async fn test_find_missing(repo: &dyn TaskRepository) {
    match repo.find_one_by_id(987_654).await {
        Err(DbError::NotFound) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}

/// Present predicates narrow; absent ones add nothing.
pub async fn test_find_many_filter(repo: &dyn TaskRepository) {
    assert!(repo.find_many(&TaskFilter::default()).await.unwrap().is_empty());

    repo.save(&new_task("alpha"), None).await.unwrap();
    repo.save(&new_task("beta"), None).await.unwrap();
    repo.save(&new_task("alpha"), None).await.unwrap();

    let all = repo.find_many(&TaskFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);

    let alphas = repo
        .find_many(&TaskFilter {
            name: Some("alpha".into()),
        })
        .await
        .unwrap();
    assert_eq!(alphas.len(), 2);
    assert!(alphas.iter().all(|t| t.name == "alpha"));

    let none = repo
        .find_many(&TaskFilter {
            name: Some("gamma".into()),
        })
        .await
        .unwrap();
    assert!(none.is_empty());
}

/// Filter values are bound, so quoting in them is inert.
pub async fn test_filter_value_is_bound(repo: &dyn TaskRepository) {
    repo.save(&new_task("plain"), None).await.unwrap();
    let hits = repo
        .find_many(&TaskFilter {
            name: Some("x' OR '1'='1".into()),
        })
        .await
        .unwrap();
    assert!(hits.is_empty());
}

/// Updates replace every mutable column and leave created_at alone.
pub async fn test_update_replaces_columns(repo: &dyn TaskRepository) {
    let id = repo.save(&new_task("draft"), None).await.unwrap();

    repo.update_by_id(id, &changes("final"), None).await.unwrap();
    let task = repo.find_one_by_id(id).await.unwrap();
    assert_eq!(task.name, "final");
    assert_eq!(task.description, None);
    assert_eq!(task.status, Some(TaskStatus::Done));
    assert!(task.attachment.as_deref().unwrap().ends_with("/x.png"));
    assert_eq!(task.created_at, at(9, 0));
    assert_eq!(task.updated_at, Some(at(10, 0)));

    // Omitting status clears it.
    let cleared = TaskChanges {
        status: None,
        updated_at: at(11, 0),
        ..changes("final")
    };
    repo.update_by_id(id, &cleared, None).await.unwrap();
    let task = repo.find_one_by_id(id).await.unwrap();
    assert_eq!(task.status, None);
    assert_eq!(task.updated_at, Some(at(11, 0)));
}

pub async fn test_update_missing_is_ok(repo: &dyn TaskRepository) {
    repo.update_by_id(424_242, &changes("ghost"), None)
        .await
        .unwrap();
    assert!(matches!(
        repo.find_one_by_id(424_242).await,
        Err(DbError::NotFound)
    ));
}

pub async fn test_transaction_commit(repo: &dyn TaskRepository) {
    let mut tx = repo.begin().await.unwrap();
    let id = repo.save(&new_task("in tx"), Some(&mut tx)).await.unwrap();
    repo.update_by_id(id, &changes("in tx, updated"), Some(&mut tx))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let task = repo.find_one_by_id(id).await.unwrap();
    assert_eq!(task.name, "in tx, updated");
}

pub async fn test_transaction_rollback(repo: &dyn TaskRepository) {
    let mut tx = repo.begin().await.unwrap();
    let id = repo.save(&new_task("discarded"), Some(&mut tx)).await.unwrap();
    tx.rollback().await.unwrap();

    assert!(matches!(
        repo.find_one_by_id(id).await,
        Err(DbError::NotFound)
    ));
}

/// A transaction dropped without commit leaves nothing behind.
pub async fn test_transaction_dropped(repo: &dyn TaskRepository) {
    let id = {
        let mut tx = repo.begin().await.unwrap();
        repo.save(&new_task("abandoned"), Some(&mut tx)).await.unwrap()
    };

    assert!(matches!(
        repo.find_one_by_id(id).await,
        Err(DbError::NotFound)
    ));
    assert!(repo
        .find_many(&TaskFilter {
            name: Some("abandoned".into()),
        })
        .await
        .unwrap()
        .is_empty());
}

// ---------------------------------------------------------------------------
// User tests
// ---------------------------------------------------------------------------

/// Expects the harness to have seeded exactly `emails`.
pub async fn test_user_listing(repo: &dyn UserRepository, emails: &[&str]) {
    let users = repo.find_many_users().await.unwrap();
    assert_eq!(users.len(), emails.len());
    for email in emails {
        assert!(users.iter().any(|u| u.email == *email), "missing {email}");
    }
}

pub async fn test_user_listing_empty(repo: &dyn UserRepository) {
    assert!(repo.find_many_users().await.unwrap().is_empty());
}
