use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::agent::Agent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Inbox,
    Assigned,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    /// Board column order.
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Inbox,
        TaskStatus::Assigned,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Done => "done",
        }
    }

    /// Human label: underscores become spaces.
    pub fn label(self) -> String {
        self.as_str().replace('_', " ")
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s || st.label() == s)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAuthor<'a> {
    Agent(&'a Agent),
    Human(&'a str),
}

impl Comment {
    /// An author is an agent when its label matches a known agent id.
    pub fn author_kind<'a>(&'a self, agents: &'a [Agent]) -> CommentAuthor<'a> {
        match agents.iter().find(|a| a.id == self.author) {
            Some(agent) => CommentAuthor::Agent(agent),
            None => CommentAuthor::Human(&self.author),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub assignee: Option<String>,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Task {
    /// "1 comment" / "N comments".
    pub fn comment_count_label(&self) -> String {
        let n = self.comments.len();
        if n == 1 {
            "1 comment".to_string()
        } else {
            format!("{n} comments")
        }
    }
}

/// Partial task update. Absent fields are left untouched by the backend;
/// `assignee: Some(None)` serializes as an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl TaskUpdate {
    /// Clear the assignee and send the task back to the inbox.
    pub fn unassign() -> Self {
        Self {
            status: Some(TaskStatus::Inbox),
            assignee: Some(None),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest<'a> {
    pub task_id: &'a str,
    pub author: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest<'a> {
    pub task_id: &'a str,
    pub updates: &'a TaskUpdate,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest<'a> {
    pub task_id: &'a str,
}
