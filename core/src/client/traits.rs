use async_trait::async_trait;

use crate::error::ApiError;
use crate::model::{Activity, Agent, Task, TaskUpdate};

/// Typed view of the backend REST API.
///
/// Pages and actions depend on this trait rather than on [`super::ApiClient`]
/// so they can run against an in-process backend in tests.
#[async_trait]
pub trait MissionApi: Send + Sync {
    async fn list_agents(&self) -> Result<Vec<Agent>, ApiError>;

    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError>;

    /// Most recent `limit` activity entries.
    async fn list_activities(&self, limit: u32) -> Result<Vec<Activity>, ApiError>;

    async fn add_comment(&self, task_id: &str, author: &str, text: &str) -> Result<(), ApiError>;

    async fn update_task(&self, task_id: &str, updates: &TaskUpdate) -> Result<(), ApiError>;

    async fn delete_task(&self, task_id: &str) -> Result<(), ApiError>;
}
