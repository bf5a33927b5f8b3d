use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use mission_core::api::{
    validate_instruction, ActionOutcome, ActionRequest, ApiError, DetailEvent, FollowUp,
    MissionApi, PollConfig, Route, Session, TaskAction, TuiConfig,
};
use tokio::sync::mpsc;

use super::input::LineEditor;
use super::page::{Page, PageUpdate};
use crate::context::AppContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing an instruction for the open task.
    Instruction(LineEditor),
    /// Waiting for y/n before running a destructive action.
    Confirm(ActionRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub is_error: bool,
}

impl Alert {
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            title: "Notice".to_string(),
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            is_error: true,
        }
    }
}

/// Result of a spawned mutation, sent back to the UI loop.
#[derive(Debug)]
pub struct ActionDone {
    pub action: TaskAction,
    pub result: Result<ActionOutcome, ApiError>,
}

pub struct App {
    pub config: TuiConfig,
    poll: PollConfig,
    author: String,
    session: Session,
    api: Arc<dyn MissionApi>,
    pub route: Route,
    pub page: Page,
    pub input_mode: InputMode,
    pub alert: Option<Alert>,
    /// Mutation in flight; further submissions are ignored until it reports.
    pub busy: Option<TaskAction>,
    action_tx: mpsc::UnboundedSender<ActionDone>,
    pub show_splash: bool,
    splash_start: Instant,
}

impl App {
    /// Mounts `start` (after the session check) and returns the receiver
    /// on which spawned actions report back.
    pub fn new(ctx: AppContext, start: Route) -> (Self, mpsc::UnboundedReceiver<ActionDone>) {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let AppContext { cfg, session, api } = ctx;
        let route = start.resolve(&session);
        let page = Page::mount(&route, &api, &cfg.poll);
        let app = Self {
            show_splash: cfg.tui.show_splash,
            config: cfg.tui,
            poll: cfg.poll,
            author: cfg.operator.author,
            session,
            api,
            route,
            page,
            input_mode: InputMode::Normal,
            alert: None,
            busy: None,
            action_tx,
            splash_start: Instant::now(),
        };
        (app, action_rx)
    }

    pub fn maybe_hide_splash(&mut self) {
        if !self.config.show_splash {
            self.show_splash = false;
            return;
        }
        let elapsed = self.splash_start.elapsed().as_millis() as u64;
        if elapsed >= self.config.splash_duration_ms {
            self.show_splash = false;
        }
    }

    /// Unmount the current page and mount `route`, redirecting to login
    /// when the session check fails.
    pub fn navigate(&mut self, route: Route) {
        let target = route.resolve(&self.session);
        tracing::info!(target: "mission.tui", from = %self.route.path(), to = %target.path(), "navigate");
        self.page = Page::mount(&target, &self.api, &self.poll);
        self.route = target;
        self.input_mode = InputMode::Normal;
    }

    pub fn handle_page_update(&mut self, update: PageUpdate) {
        let leave = match (&mut self.page, update) {
            (Page::Dashboard(m), PageUpdate::Dashboard(u)) => {
                m.view.apply(u);
                None
            }
            (Page::Agents(m), PageUpdate::Agents(u)) => {
                m.view.apply(u);
                None
            }
            (Page::Tasks(m), PageUpdate::Tasks(u)) => {
                m.view.apply(u);
                None
            }
            (Page::Detail(m), PageUpdate::Detail(u)) => match m.view.apply(u) {
                DetailEvent::Leave { message, route } => Some((message, route)),
                DetailEvent::None => None,
            },
            _ => None,
        };
        if let Some((message, route)) = leave {
            // The delete's own result does the navigation.
            if self.busy == Some(TaskAction::DeleteTask) {
                tracing::debug!(target: "mission.tui", "task gone while delete in flight");
                return;
            }
            self.alert = Some(Alert::error("Task detail", message));
            self.navigate(route);
        }
    }

    pub fn handle_action_done(&mut self, done: ActionDone) {
        self.busy = None;
        match done.result {
            Ok(outcome) => {
                tracing::info!(target: "mission.action", action = ?outcome.action, task_id = %outcome.task_id, "action succeeded");
                if outcome.action == TaskAction::AddInstruction {
                    self.input_mode = InputMode::Normal;
                }
                self.alert = Some(Alert::notice(outcome.message()));
                match outcome.follow_up {
                    FollowUp::Refresh => self.page.refresh(),
                    FollowUp::Navigate(route) => self.navigate(route),
                }
            }
            Err(err) => {
                tracing::warn!(target: "mission.action", action = ?done.action, "action failed: {err}");
                self.alert = Some(Alert::error(done.action.failure_message(), err.to_string()));
            }
        }
    }

    /// Returns true when the user asked to quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        if self.alert.is_some() {
            self.alert = None;
            return false;
        }
        self.show_splash = false;

        match std::mem::replace(&mut self.input_mode, InputMode::Normal) {
            InputMode::Instruction(editor) => {
                self.handle_instruction_key(editor, key);
                false
            }
            InputMode::Confirm(request) => {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                        self.dispatch(request)
                    }
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {}
                    _ => self.input_mode = InputMode::Confirm(request),
                }
                false
            }
            InputMode::Normal => self.handle_normal_key(key),
        }
    }

    fn handle_instruction_key(&mut self, mut editor: LineEditor, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Enter => {
                if self.busy.is_none() {
                    if let Err(err) = validate_instruction(editor.text()) {
                        self.alert = Some(Alert::error(
                            TaskAction::AddInstruction.failure_message(),
                            err.to_string(),
                        ));
                    } else if let Some(task_id) = self.detail_task_id() {
                        self.dispatch(ActionRequest::AddInstruction {
                            task_id,
                            author: self.author.clone(),
                            text: editor.text().to_string(),
                        });
                    }
                }
            }
            KeyCode::Backspace => editor.backspace(),
            KeyCode::Delete => editor.delete(),
            KeyCode::Left => editor.move_left(),
            KeyCode::Right => editor.move_right(),
            KeyCode::Home => editor.home(),
            KeyCode::End => editor.end(),
            KeyCode::Char(ch) => editor.insert_char(ch),
            _ => {}
        }
        self.input_mode = InputMode::Instruction(editor);
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('q') {
            return true;
        }
        if matches!(self.page, Page::Login) {
            if key.code == KeyCode::Enter {
                self.login();
            }
            return false;
        }

        match key.code {
            KeyCode::Char('1') | KeyCode::Char('d') => self.navigate(Route::Dashboard),
            KeyCode::Char('2') | KeyCode::Char('a') => self.navigate(Route::Agents),
            KeyCode::Char('3') | KeyCode::Char('t') => self.navigate(Route::Tasks),
            KeyCode::Char('r') => self.page.refresh_if_idle(),
            KeyCode::Char('L') => self.logout(),
            _ => self.handle_page_key(key),
        }
        false
    }

    fn handle_page_key(&mut self, key: KeyEvent) {
        let mut open = None;
        let mut back = false;
        match &mut self.page {
            Page::Agents(m) => match key.code {
                KeyCode::Down | KeyCode::Char('j') => m.view.select_next(),
                KeyCode::Up | KeyCode::Char('k') => m.view.select_prev(),
                KeyCode::Enter => open = m.view.selected_task_id().map(str::to_string),
                _ => {}
            },
            Page::Tasks(m) => match key.code {
                KeyCode::Down | KeyCode::Char('j') => m.view.select_next(),
                KeyCode::Up | KeyCode::Char('k') => m.view.select_prev(),
                KeyCode::Char('f') => m.view.cycle_filter(),
                KeyCode::Enter => open = m.view.selected_task().map(|t| t.id.clone()),
                _ => {}
            },
            Page::Detail(m) => {
                let task_id = m.view.task_id().to_string();
                let assigned = m.view.task().is_some_and(|t| t.assignee.is_some());
                match key.code {
                    KeyCode::Char('i') => {
                        self.input_mode = InputMode::Instruction(LineEditor::default())
                    }
                    KeyCode::Char('s') if assigned => {
                        self.input_mode = InputMode::Confirm(ActionRequest::StopAgent { task_id })
                    }
                    KeyCode::Char('x') => {
                        self.input_mode = InputMode::Confirm(ActionRequest::DeleteTask { task_id })
                    }
                    KeyCode::Esc | KeyCode::Backspace => back = true,
                    _ => {}
                }
            }
            Page::Dashboard(_) | Page::Login => {}
        }
        if let Some(id) = open {
            self.navigate(Route::TaskDetail(id));
        } else if back {
            self.navigate(Route::Dashboard);
        }
    }

    fn detail_task_id(&self) -> Option<String> {
        match &self.page {
            Page::Detail(m) => Some(m.view.task_id().to_string()),
            _ => None,
        }
    }

    /// Run a mutation on its own task; the outcome arrives as an [`ActionDone`].
    fn dispatch(&mut self, request: ActionRequest) {
        if self.busy.is_some() {
            return;
        }
        let action = request.action();
        self.busy = Some(action);
        let api = Arc::clone(&self.api);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = request.run(api.as_ref()).await;
            let _ = tx.send(ActionDone { action, result });
        });
    }

    fn login(&mut self) {
        match self.session.login() {
            Ok(()) => self.navigate(Route::Dashboard),
            Err(err) => self.alert = Some(Alert::error("Sign in failed", err.to_string())),
        }
    }

    fn logout(&mut self) {
        match self.session.logout() {
            Ok(()) => self.navigate(Route::Login),
            Err(err) => self.alert = Some(Alert::error("Sign out failed", err.to_string())),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mission_core::api::{
        Activity, Agent, AppConfig, DetailData, PollUpdate, Priority, Task, TaskStatus,
        TaskUpdate, Trigger,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingApi {
        calls: AtomicUsize,
        fail_mutations: bool,
    }

    impl CountingApi {
        fn failing() -> Self {
            Self {
                fail_mutations: true,
                ..Self::default()
            }
        }

        fn mutate(&self) -> Result<(), ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_mutations {
                return Err(ApiError::Status {
                    status: 500,
                    message: "HTTP 500".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl MissionApi for CountingApi {
        async fn list_agents(&self) -> Result<Vec<Agent>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }
        async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }
        async fn list_activities(&self, _limit: u32) -> Result<Vec<Activity>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }
        async fn add_comment(&self, _: &str, _: &str, _: &str) -> Result<(), ApiError> {
            self.mutate()
        }
        async fn update_task(&self, _: &str, _: &TaskUpdate) -> Result<(), ApiError> {
            self.mutate()
        }
        async fn delete_task(&self, _: &str) -> Result<(), ApiError> {
            self.mutate()
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mount_app(logged_in: bool, start: Route) -> (App, mpsc::UnboundedReceiver<ActionDone>) {
        mount_app_with(CountingApi::default(), logged_in, start)
    }

    fn mount_app_with(
        api: CountingApi,
        logged_in: bool,
        start: Route,
    ) -> (App, mpsc::UnboundedReceiver<ActionDone>) {
        let session = Session::in_memory();
        if logged_in {
            session.login().unwrap();
        }
        let ctx = AppContext::new(AppConfig::default(), session, Arc::new(api));
        App::new(ctx, start)
    }

    fn detail_update(seq: u64, result: Result<DetailData, ApiError>) -> PageUpdate {
        PageUpdate::Detail(PollUpdate {
            seq,
            trigger: Trigger::Interval,
            result,
        })
    }

    fn task_t1() -> Task {
        let ts = "2026-02-01T09:00:00Z".parse().unwrap();
        Task {
            id: "t1".to_string(),
            title: "Draft launch post".to_string(),
            description: String::new(),
            status: TaskStatus::InProgress,
            assignee: Some("loki".to_string()),
            priority: Priority::Medium,
            created_at: ts,
            updated_at: ts,
            comments: vec![],
            tags: vec![],
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(key(KeyCode::Char(ch)));
        }
    }

    #[tokio::test]
    async fn protected_start_route_redirects_to_login() {
        let (app, _rx) = mount_app(false, Route::Tasks);
        assert_eq!(app.route, Route::Login);
        assert!(matches!(app.page, Page::Login));
    }

    #[tokio::test]
    async fn enter_on_login_signs_in_and_opens_dashboard() {
        let (mut app, _rx) = mount_app(false, Route::Login);
        assert!(!app.handle_key(key(KeyCode::Enter)));
        assert_eq!(app.route, Route::Dashboard);
        assert!(matches!(app.page, Page::Dashboard(_)));

        app.handle_key(key(KeyCode::Char('L')));
        assert_eq!(app.route, Route::Login);
    }

    #[tokio::test]
    async fn page_keys_switch_routes() {
        let (mut app, _rx) = mount_app(true, Route::Dashboard);
        app.handle_key(key(KeyCode::Char('2')));
        assert_eq!(app.route, Route::Agents);
        app.handle_key(key(KeyCode::Char('t')));
        assert_eq!(app.route, Route::Tasks);
        assert!(app.handle_key(key(KeyCode::Char('q'))));
    }

    #[tokio::test]
    async fn blank_instruction_shows_error_without_dispatch() {
        let (mut app, _rx) = mount_app(true, Route::TaskDetail("t1".to_string()));
        app.handle_key(key(KeyCode::Char('i')));
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Enter));

        assert!(!app.is_busy());
        let alert = app.alert.clone().unwrap();
        assert_eq!(alert.title, "Failed to add instruction");
        assert!(matches!(app.input_mode, InputMode::Instruction(_)));
    }

    #[tokio::test]
    async fn failed_instruction_keeps_typed_text() {
        let (mut app, mut rx) = mount_app_with(
            CountingApi::failing(),
            true,
            Route::TaskDetail("t1".to_string()),
        );
        app.handle_key(key(KeyCode::Char('i')));
        type_text(&mut app, "ship it");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.busy, Some(TaskAction::AddInstruction));

        let done = rx.recv().await.unwrap();
        app.handle_action_done(done);
        assert_eq!(
            app.alert,
            Some(Alert::error("Failed to add instruction", "HTTP 500"))
        );
        match &app.input_mode {
            InputMode::Instruction(editor) => assert_eq!(editor.text(), "ship it"),
            other => panic!("expected instruction mode, got {other:?}"),
        }
        assert!(!app.is_busy());
    }

    #[tokio::test]
    async fn sent_instruction_closes_the_editor() {
        let (mut app, mut rx) = mount_app(true, Route::TaskDetail("t1".to_string()));
        app.handle_key(key(KeyCode::Char('i')));
        type_text(&mut app, "ship it");
        app.handle_key(key(KeyCode::Enter));

        let done = rx.recv().await.unwrap();
        app.handle_action_done(done);
        assert_eq!(app.alert, Some(Alert::notice("Instruction added!")));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.route, Route::TaskDetail("t1".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn successful_action_refetches_the_open_page() {
        let (mut app, _rx) = mount_app(true, Route::Dashboard);
        let first = app.page.next_update().await.unwrap();
        assert!(matches!(&first, PageUpdate::Dashboard(u) if u.trigger == Trigger::Initial));
        app.handle_page_update(first);

        app.handle_action_done(ActionDone {
            action: TaskAction::StopAgent,
            result: Ok(ActionOutcome {
                action: TaskAction::StopAgent,
                task_id: "t1".to_string(),
                follow_up: FollowUp::Refresh,
            }),
        });

        let next = app.page.next_update().await.unwrap();
        assert!(matches!(&next, PageUpdate::Dashboard(u) if u.trigger == Trigger::Manual));
        assert_eq!(
            app.alert,
            Some(Alert::notice("Agent stopped and task unassigned"))
        );
    }

    #[tokio::test]
    async fn missing_task_alerts_and_returns_to_dashboard() {
        let (mut app, _rx) = mount_app(true, Route::TaskDetail("t1".to_string()));
        app.handle_page_update(detail_update(1, Ok(DetailData::default())));

        assert_eq!(app.alert, Some(Alert::error("Task detail", "Task not found")));
        assert_eq!(app.route, Route::Dashboard);
        assert!(matches!(app.page, Page::Dashboard(_)));
    }

    #[tokio::test]
    async fn first_load_failure_leaves_detail() {
        let (mut app, _rx) = mount_app(true, Route::TaskDetail("t1".to_string()));
        app.handle_page_update(detail_update(
            1,
            Err(ApiError::Status {
                status: 503,
                message: "HTTP 503".to_string(),
            }),
        ));

        assert_eq!(
            app.alert,
            Some(Alert::error("Task detail", "Failed to load task"))
        );
        assert_eq!(app.route, Route::Dashboard);
    }

    #[tokio::test]
    async fn later_refresh_failure_keeps_detail_open() {
        let (mut app, _rx) = mount_app(true, Route::TaskDetail("t1".to_string()));
        let loaded = DetailData {
            tasks: vec![task_t1()],
            agents: vec![],
        };
        app.handle_page_update(detail_update(1, Ok(loaded)));
        app.handle_page_update(detail_update(
            2,
            Err(ApiError::Status {
                status: 502,
                message: "HTTP 502".to_string(),
            }),
        ));

        assert!(app.alert.is_none());
        assert_eq!(app.route, Route::TaskDetail("t1".to_string()));
        assert_eq!(app.page.last_error(), Some("HTTP 502"));
    }

    #[tokio::test]
    async fn task_vanishing_mid_delete_waits_for_the_delete_result() {
        let (mut app, mut rx) = mount_app(true, Route::TaskDetail("t1".to_string()));
        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Char('y')));
        assert_eq!(app.busy, Some(TaskAction::DeleteTask));

        app.handle_page_update(detail_update(1, Ok(DetailData::default())));
        assert!(app.alert.is_none());
        assert_eq!(app.route, Route::TaskDetail("t1".to_string()));

        let done = rx.recv().await.unwrap();
        app.handle_action_done(done);
        assert_eq!(app.alert, Some(Alert::notice("Task deleted")));
        assert_eq!(app.route, Route::Dashboard);
    }

    #[tokio::test]
    async fn delete_needs_confirmation_then_reports_back() {
        let (mut app, mut rx) = mount_app(true, Route::TaskDetail("t1".to_string()));
        app.handle_key(key(KeyCode::Char('x')));
        assert_eq!(
            app.input_mode,
            InputMode::Confirm(ActionRequest::DeleteTask {
                task_id: "t1".to_string()
            })
        );
        app.handle_key(key(KeyCode::Char('y')));
        assert_eq!(app.busy, Some(TaskAction::DeleteTask));

        let done = rx.recv().await.unwrap();
        app.handle_action_done(done);
        assert_eq!(app.alert, Some(Alert::notice("Task deleted")));
        assert_eq!(app.route, Route::Dashboard);
        assert!(!app.is_busy());
    }

    #[tokio::test]
    async fn declined_confirmation_does_nothing() {
        let (mut app, _rx) = mount_app(true, Route::TaskDetail("t1".to_string()));
        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(!app.is_busy());
    }

    #[tokio::test]
    async fn failed_action_keeps_page_and_shows_alert() {
        let (mut app, _rx) = mount_app(true, Route::TaskDetail("t1".to_string()));
        app.handle_action_done(ActionDone {
            action: TaskAction::StopAgent,
            result: Err(ApiError::Status {
                status: 500,
                message: "HTTP 500".to_string(),
            }),
        });
        assert_eq!(
            app.alert,
            Some(Alert::error("Failed to stop agent", "HTTP 500"))
        );
        assert_eq!(app.route, Route::TaskDetail("t1".to_string()));

        // Any key dismisses the alert.
        app.handle_key(key(KeyCode::Char('z')));
        assert!(app.alert.is_none());
    }
}
