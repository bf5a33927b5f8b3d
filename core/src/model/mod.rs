//! Wire types for the Mission Control backend.

mod activity;
mod agent;
mod task;

pub use activity::Activity;
pub use agent::{agent_display_name, Agent, AgentStatus, HEARTBEAT_WINDOW_MINUTES};
pub use task::{
    Comment, CommentAuthor, CommentRequest, DeleteRequest, Priority, Task, TaskStatus,
    TaskUpdate, UpdateRequest,
};
