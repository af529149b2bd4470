use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use mockable::Clock;

use todo_core::attachment::{AttachmentLink, AttachmentUpload};
use todo_core::task::{NewTask, Task, TaskChanges, TaskFilter, TaskRequest, TaskStatus, TaskView};
use todo_db::{DbError, TaskRepository};
use todo_store::AttachmentStore;

use crate::attachment::AttachmentPolicy;
use crate::error::INTERNAL_MESSAGE;
use crate::ServiceError;

/// Sequences repository and storage calls for tasks. Assigns status and
/// timestamps; renders times in the configured zone.
pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
    store: Arc<dyn AttachmentStore>,
    clock: Arc<dyn Clock + Send + Sync>,
    tz: Tz,
    policy: AttachmentPolicy,
}

pub(crate) fn logged(op: &'static str, e: DbError) -> ServiceError {
    if !matches!(e, DbError::NotFound) {
        tracing::error!(op, error = %e, "repository call failed");
    }
    ServiceError::from(e)
}

impl TaskService {
    pub fn new(
        repo: Arc<dyn TaskRepository>,
        store: Arc<dyn AttachmentStore>,
        clock: Arc<dyn Clock + Send + Sync>,
        tz: Tz,
        policy: AttachmentPolicy,
    ) -> Self {
        Self {
            repo,
            store,
            clock,
            tz,
            policy,
        }
    }

    pub fn policy(&self) -> &AttachmentPolicy {
        &self.policy
    }

    fn local(&self, t: DateTime<Utc>) -> DateTime<FixedOffset> {
        t.with_timezone(&self.tz).fixed_offset()
    }

    fn view(&self, task: Task) -> TaskView {
        TaskView {
            id: task.id,
            name: task.name,
            description: task.description,
            status: task.status,
            attachment: task.attachment,
            created_at: self.local(task.created_at),
            updated_at: task.updated_at.map(|t| self.local(t)),
        }
    }

    pub async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<TaskView>, ServiceError> {
        let tasks = self
            .repo
            .find_many(filter)
            .await
            .map_err(|e| logged("list_tasks", e))?;
        Ok(tasks.into_iter().map(|t| self.view(t)).collect())
    }

    pub async fn get_task(&self, id: i64) -> Result<TaskView, ServiceError> {
        let task = self
            .repo
            .find_one_by_id(id)
            .await
            .map_err(|e| logged("get_task", e))?;
        Ok(self.view(task))
    }

    /// New tasks always start `Initiated`. The attachment is echoed back but
    /// not persisted on create; it is stored through an update.
    pub async fn create_task(&self, req: TaskRequest) -> Result<TaskView, ServiceError> {
        req.validate()?;
        let new = NewTask {
            name: req.name,
            description: req.description,
            status: TaskStatus::Initiated,
            created_at: self.clock.utc(),
        };
        let id = self
            .repo
            .save(&new, None)
            .await
            .map_err(|e| logged("create_task", e))?;
        tracing::info!(id, "task created");
        Ok(TaskView {
            id,
            name: new.name,
            description: new.description,
            status: Some(new.status),
            attachment: req.attachment,
            created_at: self.local(new.created_at),
            updated_at: None,
        })
    }

    /// Full replacement of the mutable fields. The existence check and the
    /// write are separate statements.
    pub async fn update_task(&self, id: i64, req: TaskRequest) -> Result<TaskView, ServiceError> {
        req.validate()?;
        let existing = self
            .repo
            .find_one_by_id(id)
            .await
            .map_err(|e| logged("update_task", e))?;

        let now = self.clock.utc();
        let updated_at = if now > existing.created_at {
            now
        } else {
            existing.created_at + chrono::Duration::microseconds(1)
        };
        let changes = TaskChanges {
            name: req.name,
            description: req.description,
            status: req.status,
            attachment: req.attachment,
            updated_at,
        };
        self.repo
            .update_by_id(id, &changes, None)
            .await
            .map_err(|e| logged("update_task", e))?;

        Ok(TaskView {
            id,
            name: changes.name,
            description: changes.description,
            status: changes.status,
            attachment: changes.attachment,
            created_at: self.local(existing.created_at),
            updated_at: Some(self.local(updated_at)),
        })
    }

    /// Store the file and return its public URL. The task row is untouched.
    pub async fn upload_attachment(
        &self,
        folder: &str,
        upload: AttachmentUpload,
    ) -> Result<AttachmentLink, ServiceError> {
        self.policy.check_folder(folder)?;
        if upload.name_param.is_empty() {
            return Err(ServiceError::BadRequest(
                "Invalid file name parameter".into(),
            ));
        }
        self.policy.check_extension(&upload.extension)?;

        let key = self
            .policy
            .object_key(folder, &upload.name_param, &upload.extension);
        self.store
            .put(&self.policy.bucket, &key, upload.data, &self.policy.content_type)
            .await
            .map_err(|e| {
                tracing::error!(bucket = %self.policy.bucket, key = %key, error = %e, "attachment upload failed");
                ServiceError::Internal(INTERNAL_MESSAGE.into())
            })?;

        tracing::info!(key = %key, size = upload.size, file = %upload.file_name, "attachment stored");
        Ok(AttachmentLink {
            image_url: self.policy.public_url(&key),
        })
    }
}
