//! Record shapes returned by the audit query

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// One audit log entry joined with the acting user's name.
///
/// Fields absent from the response stay `None`; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditLog {
    #[serde(rename = "auditid")]
    pub audit_id: Option<Uuid>,

    #[serde(rename = "_objectid_value")]
    pub object_id: Option<Uuid>,

    #[serde(rename = "systemuser1.fullname")]
    pub user_name: Option<String>,

    #[serde(rename = "createdon")]
    pub created_on: Option<DateTime<Utc>>,
}

impl fmt::Display for AuditLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User='{}', Date='{}'",
            self.user_name.as_deref().unwrap_or(""),
            self.created_on.map(|d| d.to_rfc3339()).unwrap_or_default()
        )
    }
}
