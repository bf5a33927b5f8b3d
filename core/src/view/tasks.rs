use std::sync::Arc;

use super::{Applied, Loadable};
use crate::board::{count_with_status, filter_by_status, StatusFilter};
use crate::client::MissionApi;
use crate::model::{agent_display_name, Agent, Task, TaskStatus};
use crate::poll::{fetch_fn, FetchFn, PollUpdate};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TasksData {
    pub tasks: Vec<Task>,
    pub agents: Vec<Agent>,
}

#[derive(Debug, Default)]
pub struct TasksView {
    state: Loadable<TasksData>,
    filter: StatusFilter,
    selected: usize,
}

impl TasksView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetcher(api: Arc<dyn MissionApi>) -> FetchFn<TasksData> {
        fetch_fn(move || {
            let api = Arc::clone(&api);
            async move {
                let (tasks, agents) = futures::try_join!(api.list_tasks(), api.list_agents())?;
                Ok(TasksData { tasks, agents })
            }
        })
    }

    pub fn apply(&mut self, update: PollUpdate<TasksData>) -> Applied {
        let applied = self.state.apply(update);
        self.clamp_selection();
        applied
    }

    pub fn state(&self) -> &Loadable<TasksData> {
        &self.state
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
        self.selected = 0;
    }

    pub fn cycle_filter(&mut self) {
        self.set_filter(self.filter.next());
    }

    pub fn visible(&self) -> Vec<&Task> {
        filter_by_status(&self.state.data().tasks, self.filter)
    }

    pub fn total(&self) -> usize {
        self.state.data().tasks.len()
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        count_with_status(&self.state.data().tasks, status)
    }

    pub fn assignee_name<'a>(&'a self, task: &'a Task) -> Option<&'a str> {
        task.assignee
            .as_deref()
            .map(|id| agent_display_name(&self.state.data().agents, id))
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.visible().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.visible().len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}
