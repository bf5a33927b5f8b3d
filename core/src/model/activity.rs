use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only activity feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    /// Backend-defined tag such as `task_created` or `comment_added`.
    #[serde(rename = "type")]
    pub kind: String,
    pub agent_id: String,
    pub message: String,
    #[serde(default)]
    pub task_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}
