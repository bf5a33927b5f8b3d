//! Page view state, independent of any terminal.
//!
//! Every page keeps its last good snapshot in a [`Loadable`] and feeds poll
//! results through [`Loadable::apply`].

mod agents;
mod dashboard;
mod detail;
mod tasks;

pub use agents::AgentsView;
pub use dashboard::{DashboardData, DashboardView};
pub use detail::{DetailData, DetailEvent, TaskDetailView};
pub use tasks::{TasksData, TasksView};

use crate::poll::{Freshness, PollUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    /// Refresh failed; the previous data stays on screen.
    Failed,
    /// Older than what is already displayed.
    Stale,
}

#[derive(Debug, Clone)]
pub struct Loadable<T> {
    data: T,
    loading: bool,
    freshness: Freshness,
    last_error: Option<String>,
}

impl<T: Default> Default for Loadable<T> {
    fn default() -> Self {
        Self {
            data: T::default(),
            loading: true,
            freshness: Freshness::default(),
            last_error: None,
        }
    }
}

impl<T> Loadable<T> {
    pub fn data(&self) -> &T {
        &self.data
    }

    /// True until the first response (success or failure) arrives.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn apply(&mut self, update: PollUpdate<T>) -> Applied {
        if update.seq <= self.freshness.last_applied() {
            tracing::debug!(
                target: "mission.view",
                seq = update.seq,
                applied = self.freshness.last_applied(),
                "discarding stale response"
            );
            return Applied::Stale;
        }
        self.loading = false;
        match update.result {
            Ok(data) => {
                self.freshness.accept(update.seq);
                self.data = data;
                self.last_error = None;
                Applied::Updated
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Applied::Failed
            }
        }
    }
}
