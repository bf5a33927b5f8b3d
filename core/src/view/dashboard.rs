use std::sync::Arc;

use super::{Applied, Loadable};
use crate::board::{group_by_status, BoardColumn};
use crate::client::MissionApi;
use crate::model::{agent_display_name, Activity, Agent, Task};
use crate::poll::{fetch_fn, FetchFn, PollUpdate};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardData {
    pub agents: Vec<Agent>,
    pub tasks: Vec<Task>,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Default)]
pub struct DashboardView {
    state: Loadable<DashboardData>,
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Agents, tasks and the latest `activity_limit` activities, fetched concurrently.
    pub fn fetcher(api: Arc<dyn MissionApi>, activity_limit: u32) -> FetchFn<DashboardData> {
        fetch_fn(move || {
            let api = Arc::clone(&api);
            async move {
                let (agents, tasks, activities) = futures::try_join!(
                    api.list_agents(),
                    api.list_tasks(),
                    api.list_activities(activity_limit)
                )?;
                Ok(DashboardData {
                    agents,
                    tasks,
                    activities,
                })
            }
        })
    }

    pub fn apply(&mut self, update: PollUpdate<DashboardData>) -> Applied {
        self.state.apply(update)
    }

    pub fn state(&self) -> &Loadable<DashboardData> {
        &self.state
    }

    pub fn agents(&self) -> &[Agent] {
        &self.state.data().agents
    }

    pub fn activities(&self) -> &[Activity] {
        &self.state.data().activities
    }

    pub fn columns(&self) -> Vec<BoardColumn<'_>> {
        group_by_status(&self.state.data().tasks)
    }

    pub fn assignee_name<'a>(&'a self, task: &'a Task) -> Option<&'a str> {
        task.assignee
            .as_deref()
            .map(|id| agent_display_name(self.agents(), id))
    }
}
