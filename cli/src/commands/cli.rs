use clap::{Args as ClapArgs, Parser, Subcommand};
use mission_core::api::StatusFilter;

#[derive(Parser, Debug)]
#[command(name = "mission-control", version, about = "Agent fleet dashboard")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend base URL; overrides the config file and MISSION_CONTROL_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Sent as X-API-Key; overrides the config file and MISSION_CONTROL_API_KEY.
    #[arg(long, global = true)]
    pub api_key: Option<String>,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct TuiArgs {
    /// Start on this path, e.g. `/tasks` or `/tasks/abc123`.
    #[arg(long)]
    pub route: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct OutputArgs {
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct TasksArgs {
    /// `all` or a status (`inbox`, `assigned`, `in_progress`, `review`, `done`).
    #[arg(long, value_parser = parse_status_filter, default_value = "all")]
    pub status: StatusFilter,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ActivityArgs {
    /// Defaults to `poll.activity_limit`.
    #[arg(long)]
    pub limit: Option<u32>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TaskCommand {
    /// Task details and comment thread.
    Show {
        id: String,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Post an instruction to the task's comment thread.
    Comment { id: String, text: String },
    /// Unassign the task and send it back to the inbox.
    Stop {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y', default_value_t = false)]
        yes: bool,
    },
    Delete {
        id: String,
        #[arg(long, short = 'y', default_value_t = false)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Interactive dashboard (default).
    Tui(TuiArgs),
    Login,
    Logout,
    Agents(OutputArgs),
    Tasks(TasksArgs),
    Board(OutputArgs),
    Activity(ActivityArgs),
    Task(TaskArgs),
}

fn parse_status_filter(s: &str) -> Result<StatusFilter, String> {
    StatusFilter::parse(s).ok_or_else(|| {
        format!("unknown status '{s}' (expected all, inbox, assigned, in_progress, review or done)")
    })
}
