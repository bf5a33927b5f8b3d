//! Stable re-exports for consumers (`cli` and external crates).
//!
//! Prefer importing from `mission_core::api` instead of reaching into internal modules.

pub use crate::actions::{
    add_instruction, delete_task, stop_agent, validate_instruction, ActionOutcome, ActionRequest,
    FollowUp, TaskAction,
};
pub use crate::board::{
    count_with_status, filter_by_status, format_date, format_datetime, format_time,
    group_by_status, BoardColumn, StatusFilter,
};
pub use crate::client::{ApiClient, MissionApi, RequestOptions};
pub use crate::config::{
    get_session_file_path, load_default, AppConfig, LoggingConfig, PollConfig, TuiConfig,
};
pub use crate::error::{ApiError, CliError, ValidationError};
pub use crate::model::{
    agent_display_name, Activity, Agent, AgentStatus, Comment, CommentAuthor, Priority, Task,
    TaskStatus, TaskUpdate,
};
pub use crate::poll::{spawn_poller, PollHandle, PollUpdate, Trigger};
pub use crate::routes::{access_guard, GateDecision, Route};
pub use crate::session::Session;
pub use crate::view::{
    AgentsView, Applied, DashboardData, DashboardView, DetailData, DetailEvent, TaskDetailView,
    TasksData, TasksView,
};
