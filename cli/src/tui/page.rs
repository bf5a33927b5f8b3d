//! A mounted page: its view state, its poller and the receiver the poller feeds.
//!
//! Replacing the `Page` drops the old poller (cancelling its token) and its
//! receiver, so nothing from a previous page can reach the new one.
use std::sync::Arc;
use std::time::Duration;

use mission_core::api::{
    spawn_poller, Agent, AgentsView, DashboardData, DashboardView, DetailData, MissionApi,
    PollConfig, PollHandle, PollUpdate, Route, TaskDetailView, TasksData, TasksView,
};
use mission_core::poll::FetchFn;
use tokio::sync::mpsc;

pub struct Mounted<V, T> {
    pub view: V,
    poll: PollHandle<T>,
    rx: mpsc::UnboundedReceiver<PollUpdate<T>>,
}

impl<V, T: Send + 'static> Mounted<V, T> {
    fn spawn(name: &'static str, view: V, interval: Duration, fetch: FetchFn<T>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let poll = spawn_poller(name, interval, fetch, tx);
        Self { view, poll, rx }
    }

    fn refresh(&self) -> u64 {
        self.poll.refresh_now()
    }

    fn refresh_if_idle(&self) -> Option<u64> {
        self.poll.refresh_if_idle()
    }
}

pub enum Page {
    Login,
    Dashboard(Mounted<DashboardView, DashboardData>),
    Agents(Mounted<AgentsView, Vec<Agent>>),
    Tasks(Mounted<TasksView, TasksData>),
    Detail(Mounted<TaskDetailView, DetailData>),
}

pub enum PageUpdate {
    Dashboard(PollUpdate<DashboardData>),
    Agents(PollUpdate<Vec<Agent>>),
    Tasks(PollUpdate<TasksData>),
    Detail(PollUpdate<DetailData>),
}

impl Page {
    /// Mount `route`; every page but login starts polling immediately.
    pub fn mount(route: &Route, api: &Arc<dyn MissionApi>, cfg: &PollConfig) -> Page {
        let interval = Duration::from_millis(cfg.interval_ms);
        let api = Arc::clone(api);
        match route {
            Route::Login => Page::Login,
            Route::Dashboard => Page::Dashboard(Mounted::spawn(
                "dashboard",
                DashboardView::new(),
                interval,
                DashboardView::fetcher(api, cfg.activity_limit),
            )),
            Route::Agents => Page::Agents(Mounted::spawn(
                "agents",
                AgentsView::new(),
                interval,
                AgentsView::fetcher(api),
            )),
            Route::Tasks => Page::Tasks(Mounted::spawn(
                "tasks",
                TasksView::new(),
                interval,
                TasksView::fetcher(api),
            )),
            Route::TaskDetail(id) => Page::Detail(Mounted::spawn(
                "task-detail",
                TaskDetailView::new(id.clone()),
                interval,
                TaskDetailView::fetcher(api),
            )),
        }
    }

    /// Next poll result for this page. Login never yields.
    pub async fn next_update(&mut self) -> Option<PageUpdate> {
        match self {
            Page::Login => std::future::pending().await,
            Page::Dashboard(m) => m.rx.recv().await.map(PageUpdate::Dashboard),
            Page::Agents(m) => m.rx.recv().await.map(PageUpdate::Agents),
            Page::Tasks(m) => m.rx.recv().await.map(PageUpdate::Tasks),
            Page::Detail(m) => m.rx.recv().await.map(PageUpdate::Detail),
        }
    }

    /// Refetch on request from the user; skipped while a fetch is pending.
    pub fn refresh_if_idle(&self) {
        let seq = match self {
            Page::Login => return,
            Page::Dashboard(m) => m.refresh_if_idle(),
            Page::Agents(m) => m.refresh_if_idle(),
            Page::Tasks(m) => m.refresh_if_idle(),
            Page::Detail(m) => m.refresh_if_idle(),
        };
        match seq {
            Some(seq) => tracing::debug!(target: "mission.tui", seq, "manual refresh"),
            None => tracing::debug!(target: "mission.tui", "refresh skipped; fetch pending"),
        }
    }

    /// Out-of-schedule refetch after a mutation; always issued.
    pub fn refresh(&self) {
        let seq = match self {
            Page::Login => return,
            Page::Dashboard(m) => m.refresh(),
            Page::Agents(m) => m.refresh(),
            Page::Tasks(m) => m.refresh(),
            Page::Detail(m) => m.refresh(),
        };
        tracing::debug!(target: "mission.tui", seq, "refresh after action");
    }

    /// True until the first response arrives.
    pub fn is_loading(&self) -> bool {
        match self {
            Page::Login => false,
            Page::Dashboard(m) => m.view.state().is_loading(),
            Page::Agents(m) => m.view.state().is_loading(),
            Page::Tasks(m) => m.view.state().is_loading(),
            Page::Detail(m) => m.view.state().is_loading(),
        }
    }

    /// Error from the most recent failed refresh, while stale data is shown.
    pub fn last_error(&self) -> Option<&str> {
        match self {
            Page::Login => None,
            Page::Dashboard(m) => m.view.state().last_error(),
            Page::Agents(m) => m.view.state().last_error(),
            Page::Tasks(m) => m.view.state().last_error(),
            Page::Detail(m) => m.view.state().last_error(),
        }
    }
}
