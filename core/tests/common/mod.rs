#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mission_core::client::MissionApi;
use mission_core::error::ApiError;
use mission_core::model::{
    Activity, Agent, AgentStatus, Comment, Priority, Task, TaskStatus, TaskUpdate,
};

pub fn ts(s: &str) -> DateTime<Utc> {
    s.parse().expect("valid RFC 3339 timestamp")
}

pub fn agent(id: &str, name: &str, status: AgentStatus, minute: u8) -> Agent {
    Agent {
        id: id.to_string(),
        name: name.to_string(),
        role: "Specialist".to_string(),
        status,
        current_task_id: None,
        session_key: format!("agent:{id}:main"),
        heartbeat_minute: minute,
    }
}

pub fn task(id: &str, status: TaskStatus, assignee: Option<&str>) -> Task {
    Task {
        id: id.to_string(),
        title: format!("Task {id}"),
        description: format!("Description for {id}"),
        status,
        assignee: assignee.map(str::to_string),
        priority: Priority::Medium,
        created_at: ts("2026-02-01T09:00:00Z"),
        updated_at: ts("2026-02-01T09:00:00Z"),
        comments: vec![],
        tags: vec![],
    }
}

/// Stateful in-process backend that applies mutations the way the real
/// service does and records every call.
pub struct MockBackend {
    agents: Mutex<Vec<Agent>>,
    tasks: Mutex<Vec<Task>>,
    activities: Mutex<Vec<Activity>>,
    calls: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new(agents: Vec<Agent>, tasks: Vec<Task>) -> Self {
        Self {
            agents: Mutex::new(agents),
            tasks: Mutex::new(tasks),
            activities: Mutex::new(vec![]),
            calls: Mutex::new(vec![]),
        }
    }

    pub fn seeded() -> Self {
        let mut jarvis = agent("jarvis", "Jarvis", AgentStatus::Active, 0);
        jarvis.current_task_id = Some("t2".to_string());
        Self::new(
            vec![jarvis, agent("shuri", "Shuri", AgentStatus::Idle, 7)],
            vec![
                task("t1", TaskStatus::Inbox, None),
                task("t2", TaskStatus::InProgress, Some("jarvis")),
                task("t3", TaskStatus::Done, Some("shuri")),
            ],
        )
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, endpoint: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == endpoint)
            .count()
    }

    fn record(&self, endpoint: &str) {
        self.calls.lock().unwrap().push(endpoint.to_string());
    }

    fn not_found() -> ApiError {
        ApiError::Status {
            status: 404,
            message: "Task not found".to_string(),
        }
    }
}

#[async_trait]
impl MissionApi for MockBackend {
    async fn list_agents(&self) -> Result<Vec<Agent>, ApiError> {
        self.record("GET /agents");
        Ok(self.agents.lock().unwrap().clone())
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.record("GET /tasks");
        Ok(self.tasks.lock().unwrap().clone())
    }

    async fn list_activities(&self, limit: u32) -> Result<Vec<Activity>, ApiError> {
        self.record("GET /activities");
        let activities = self.activities.lock().unwrap();
        Ok(activities.iter().take(limit as usize).cloned().collect())
    }

    async fn add_comment(&self, task_id: &str, author: &str, text: &str) -> Result<(), ApiError> {
        self.record("POST /tasks/comment");
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(Self::not_found)?;
        task.comments.push(Comment {
            author: author.to_string(),
            timestamp: Utc::now(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn update_task(&self, task_id: &str, updates: &TaskUpdate) -> Result<(), ApiError> {
        self.record("POST /tasks/update");
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(Self::not_found)?;
        if let Some(status) = updates.status {
            task.status = status;
        }
        if let Some(assignee) = &updates.assignee {
            task.assignee = assignee.clone();
        }
        if let Some(priority) = updates.priority {
            task.priority = priority;
        }
        if let Some(title) = &updates.title {
            task.title = title.clone();
        }
        task.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_task(&self, task_id: &str) -> Result<(), ApiError> {
        self.record("POST /tasks/delete");
        let mut tasks = self.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|t| t.id != task_id);
        if tasks.len() == before {
            return Err(Self::not_found());
        }
        Ok(())
    }
}
