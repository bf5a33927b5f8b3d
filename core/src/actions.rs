//! Task mutations issued from the detail view.
//!
//! Each call makes at most one API request and returns an [`ActionOutcome`];
//! the caller decides whether to refresh or navigate.

use crate::client::MissionApi;
use crate::error::{ApiError, ValidationError};
use crate::model::TaskUpdate;
use crate::routes::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    AddInstruction,
    StopAgent,
    DeleteTask,
}

impl TaskAction {
    pub fn confirm_prompt(self) -> Option<&'static str> {
        match self {
            TaskAction::AddInstruction => None,
            TaskAction::StopAgent => Some("Stop the agent and unassign this task?"),
            TaskAction::DeleteTask => {
                Some("Are you sure you want to delete this task? This cannot be undone.")
            }
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            TaskAction::AddInstruction => "Instruction added!",
            TaskAction::StopAgent => "Agent stopped and task unassigned",
            TaskAction::DeleteTask => "Task deleted",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            TaskAction::AddInstruction => "Failed to add instruction",
            TaskAction::StopAgent => "Failed to stop agent",
            TaskAction::DeleteTask => "Failed to delete task",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    /// Re-fetch the current page.
    Refresh,
    Navigate(Route),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub action: TaskAction,
    pub task_id: String,
    pub follow_up: FollowUp,
}

impl ActionOutcome {
    pub fn message(&self) -> &'static str {
        self.action.success_message()
    }
}

/// Owned form of an action, for handing to a spawned task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    AddInstruction {
        task_id: String,
        author: String,
        text: String,
    },
    StopAgent {
        task_id: String,
    },
    DeleteTask {
        task_id: String,
    },
}

impl ActionRequest {
    pub fn action(&self) -> TaskAction {
        match self {
            ActionRequest::AddInstruction { .. } => TaskAction::AddInstruction,
            ActionRequest::StopAgent { .. } => TaskAction::StopAgent,
            ActionRequest::DeleteTask { .. } => TaskAction::DeleteTask,
        }
    }

    pub async fn run(&self, api: &dyn MissionApi) -> Result<ActionOutcome, ApiError> {
        match self {
            ActionRequest::AddInstruction {
                task_id,
                author,
                text,
            } => add_instruction(api, task_id, author, text).await,
            ActionRequest::StopAgent { task_id } => stop_agent(api, task_id).await,
            ActionRequest::DeleteTask { task_id } => delete_task(api, task_id).await,
        }
    }
}

/// Rejects whitespace-only text before any request is made.
pub fn validate_instruction(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyInstruction);
    }
    Ok(())
}

#[tracing::instrument(name = "action.add_instruction", skip(api, text), fields(len = text.len()))]
pub async fn add_instruction(
    api: &dyn MissionApi,
    task_id: &str,
    author: &str,
    text: &str,
) -> Result<ActionOutcome, ApiError> {
    validate_instruction(text)?;
    api.add_comment(task_id, author, text).await?;
    tracing::info!(target: "mission.action", task_id, "instruction added");
    Ok(ActionOutcome {
        action: TaskAction::AddInstruction,
        task_id: task_id.to_string(),
        follow_up: FollowUp::Refresh,
    })
}

#[tracing::instrument(name = "action.stop_agent", skip(api))]
pub async fn stop_agent(api: &dyn MissionApi, task_id: &str) -> Result<ActionOutcome, ApiError> {
    api.update_task(task_id, &TaskUpdate::unassign()).await?;
    tracing::info!(target: "mission.action", task_id, "agent stopped, task back in inbox");
    Ok(ActionOutcome {
        action: TaskAction::StopAgent,
        task_id: task_id.to_string(),
        follow_up: FollowUp::Refresh,
    })
}

#[tracing::instrument(name = "action.delete_task", skip(api))]
pub async fn delete_task(api: &dyn MissionApi, task_id: &str) -> Result<ActionOutcome, ApiError> {
    api.delete_task(task_id).await?;
    tracing::info!(target: "mission.action", task_id, "task deleted");
    Ok(ActionOutcome {
        action: TaskAction::DeleteTask,
        task_id: task_id.to_string(),
        follow_up: FollowUp::Navigate(Route::Dashboard),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Activity, Agent, Task};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingApi {
        calls: Mutex<Vec<String>>,
        fail_with: Option<u16>,
    }

    impl RecordingApi {
        fn record(&self, call: String) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(call);
            match self.fail_with {
                Some(status) => Err(ApiError::Status {
                    status,
                    message: format!("HTTP {status}"),
                }),
                None => Ok(()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MissionApi for RecordingApi {
        async fn list_agents(&self) -> Result<Vec<Agent>, ApiError> {
            Ok(vec![])
        }
        async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
            Ok(vec![])
        }
        async fn list_activities(&self, _limit: u32) -> Result<Vec<Activity>, ApiError> {
            Ok(vec![])
        }
        async fn add_comment(&self, task_id: &str, author: &str, text: &str) -> Result<(), ApiError> {
            self.record(format!("comment {task_id} {author} {text}"))
        }
        async fn update_task(&self, task_id: &str, updates: &TaskUpdate) -> Result<(), ApiError> {
            self.record(format!("update {task_id} {}", serde_json::to_string(updates).unwrap()))
        }
        async fn delete_task(&self, task_id: &str) -> Result<(), ApiError> {
            self.record(format!("delete {task_id}"))
        }
    }

    #[tokio::test]
    async fn whitespace_instruction_makes_no_request() {
        let api = RecordingApi::default();
        for text in ["", "   ", "\n\t "] {
            let err = add_instruction(&api, "t1", "khayal", text).await.unwrap_err();
            assert!(matches!(err, ApiError::Validation(ValidationError::EmptyInstruction)));
        }
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn instruction_posts_text_unmodified_and_requests_refresh() {
        let api = RecordingApi::default();
        let outcome = add_instruction(&api, "t1", "khayal", " check logs ").await.unwrap();
        assert_eq!(api.calls(), vec!["comment t1 khayal  check logs ".to_string()]);
        assert_eq!(outcome.follow_up, FollowUp::Refresh);
        assert_eq!(outcome.message(), "Instruction added!");
    }

    #[tokio::test]
    async fn stop_agent_sends_unassign_patch() {
        let api = RecordingApi::default();
        let outcome = stop_agent(&api, "t7").await.unwrap();
        assert_eq!(
            api.calls(),
            vec![r#"update t7 {"status":"inbox","assignee":null}"#.to_string()]
        );
        assert_eq!(outcome.follow_up, FollowUp::Refresh);
    }

    #[tokio::test]
    async fn delete_navigates_to_dashboard() {
        let api = RecordingApi::default();
        let req = ActionRequest::DeleteTask {
            task_id: "t3".to_string(),
        };
        let outcome = req.run(&api).await.unwrap();
        assert_eq!(outcome.follow_up, FollowUp::Navigate(Route::Dashboard));
        assert_eq!(outcome.message(), "Task deleted");
        assert_eq!(api.calls(), vec!["delete t3".to_string()]);
    }

    #[tokio::test]
    async fn failures_propagate_backend_error() {
        let api = RecordingApi {
            fail_with: Some(500),
            ..RecordingApi::default()
        };
        let err = stop_agent(&api, "t1").await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500");
        assert_eq!(TaskAction::StopAgent.failure_message(), "Failed to stop agent");
    }

    #[test]
    fn only_destructive_actions_confirm() {
        assert!(TaskAction::AddInstruction.confirm_prompt().is_none());
        assert!(TaskAction::StopAgent.confirm_prompt().is_some());
        assert!(TaskAction::DeleteTask
            .confirm_prompt()
            .unwrap()
            .contains("cannot be undone"));
    }
}
