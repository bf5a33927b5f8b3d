use std::sync::Arc;

use super::{Applied, Loadable};
use crate::client::MissionApi;
use crate::model::Agent;
use crate::poll::{fetch_fn, FetchFn, PollUpdate};

#[derive(Debug, Default)]
pub struct AgentsView {
    state: Loadable<Vec<Agent>>,
    selected: usize,
}

impl AgentsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetcher(api: Arc<dyn MissionApi>) -> FetchFn<Vec<Agent>> {
        fetch_fn(move || {
            let api = Arc::clone(&api);
            async move { api.list_agents().await }
        })
    }

    pub fn apply(&mut self, update: PollUpdate<Vec<Agent>>) -> Applied {
        let applied = self.state.apply(update);
        self.selected = self.selected.min(self.agents().len().saturating_sub(1));
        applied
    }

    pub fn state(&self) -> &Loadable<Vec<Agent>> {
        &self.state
    }

    pub fn agents(&self) -> &[Agent] {
        self.state.data()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.agents().len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Task the selected agent is working on, if any.
    pub fn selected_task_id(&self) -> Option<&str> {
        self.agents()
            .get(self.selected)
            .and_then(|a| a.current_task_id.as_deref())
    }
}
