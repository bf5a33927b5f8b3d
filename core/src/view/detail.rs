use std::sync::Arc;

use super::{Applied, Loadable};
use crate::client::MissionApi;
use crate::model::{Agent, Task};
use crate::poll::{fetch_fn, FetchFn, PollUpdate};
use crate::routes::Route;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailData {
    pub tasks: Vec<Task>,
    pub agents: Vec<Agent>,
}

/// What the page should do after a response was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailEvent {
    None,
    /// Show `message` and leave for `route`.
    Leave { message: &'static str, route: Route },
}

#[derive(Debug)]
pub struct TaskDetailView {
    task_id: String,
    state: Loadable<DetailData>,
}

impl TaskDetailView {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            state: Loadable::default(),
        }
    }

    pub fn fetcher(api: Arc<dyn MissionApi>) -> FetchFn<DetailData> {
        fetch_fn(move || {
            let api = Arc::clone(&api);
            async move {
                let (tasks, agents) = futures::try_join!(api.list_tasks(), api.list_agents())?;
                Ok(DetailData { tasks, agents })
            }
        })
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn state(&self) -> &Loadable<DetailData> {
        &self.state
    }

    /// A missing task always leaves the page; a failed fetch only does so
    /// before anything was shown.
    pub fn apply(&mut self, update: PollUpdate<DetailData>) -> DetailEvent {
        let first_load = self.state.is_loading();
        match self.state.apply(update) {
            Applied::Stale => DetailEvent::None,
            Applied::Failed if first_load => DetailEvent::Leave {
                message: "Failed to load task",
                route: Route::Dashboard,
            },
            Applied::Failed => DetailEvent::None,
            Applied::Updated if self.task().is_none() => {
                tracing::info!(target: "mission.view", task_id = %self.task_id, "task not found");
                DetailEvent::Leave {
                    message: "Task not found",
                    route: Route::Dashboard,
                }
            }
            Applied::Updated => DetailEvent::None,
        }
    }

    pub fn task(&self) -> Option<&Task> {
        self.state
            .data()
            .tasks
            .iter()
            .find(|t| t.id == self.task_id)
    }

    pub fn agents(&self) -> &[Agent] {
        &self.state.data().agents
    }

    pub fn assigned_agent(&self) -> Option<&Agent> {
        let assignee = self.task()?.assignee.as_deref()?;
        self.agents().iter().find(|a| a.id == assignee)
    }
}
