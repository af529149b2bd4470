use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Lifecycle of a task. Persisted and serialized as a small integer.
///
/// There is no transition graph: any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub enum TaskStatus {
    Initiated,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn code(&self) -> i16 {
        match self {
            TaskStatus::Initiated => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Done => 2,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(TaskStatus::Initiated),
            1 => Some(TaskStatus::InProgress),
            2 => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

impl From<TaskStatus> for i16 {
    fn from(status: TaskStatus) -> Self {
        status.code()
    }
}

impl TryFrom<i16> for TaskStatus {
    type Error = String;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        TaskStatus::from_code(code).ok_or_else(|| format!("unknown task status {code}"))
    }
}

/// A persisted task row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub attachment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Columns written when a task is first stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub name: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

/// Full replacement of the mutable columns of a task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskChanges {
    pub name: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub attachment: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a create or update call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub attachment: Option<String>,
}

impl TaskRequest {
    /// Returns the first failing field, if any.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::new("name", &self.name));
        }
        Ok(())
    }
}

/// Optional predicates for listing tasks. Absent fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskFilter {
    pub name: Option<String>,
}

/// External representation of a task.
///
/// Nullable fields are always serialized, as `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub attachment: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn status_codes_round_trip() {
        for status in [TaskStatus::Initiated, TaskStatus::InProgress, TaskStatus::Done] {
            assert_eq!(TaskStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(TaskStatus::from_code(3), None);
        assert_eq!(TaskStatus::from_code(-1), None);
    }

    #[test]
    fn status_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&TaskStatus::Done).unwrap(), "2");
        let parsed: TaskStatus = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, TaskStatus::InProgress);
        assert!(serde_json::from_str::<TaskStatus>("7").is_err());
    }

    #[test]
    fn request_defaults_missing_fields() {
        let req: TaskRequest = serde_json::from_str(r#"{"name": "write spec"}"#).unwrap();
        assert_eq!(req.name, "write spec");
        assert_eq!(req.description, None);
        assert_eq!(req.status, None);
        assert_eq!(req.attachment, None);
    }

    #[test]
    fn validate_requires_name() {
        assert!(TaskRequest {
            name: "a".into(),
            ..Default::default()
        }
        .validate()
        .is_ok());

        let err = TaskRequest::default().validate().unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(err.to_string(), "invalid 'name' with value ''");
    }

    #[test]
    fn view_serializes_nulls_explicitly() {
        let created = FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 1, 9, 30, 0)
            .unwrap();
        let view = TaskView {
            id: 4,
            name: "write spec".into(),
            description: None,
            status: Some(TaskStatus::Initiated),
            attachment: None,
            created_at: created,
            updated_at: None,
        };
        let v = serde_json::to_value(&view).unwrap();
        assert_eq!(v["id"], 4);
        assert_eq!(v["status"], 0);
        assert!(v["description"].is_null());
        assert!(v["attachment"].is_null());
        assert!(v["updatedAt"].is_null());
        assert_eq!(v["createdAt"], "2024-05-01T09:30:00+07:00");
        assert!(v.as_object().unwrap().contains_key("updatedAt"));
    }
}
