use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// A row of the user table. Read-only from this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub uuid: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub uuid: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<FixedOffset>,
}
