use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub operator: OperatorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub tui: TuiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sent as `X-API-Key` on every request. Empty is allowed.
    #[serde(default)]
    pub api_key: String,

    /// Optional per-request timeout. Unset means requests wait indefinitely.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,

    /// Number of entries requested for the dashboard activity feed.
    #[serde(default = "default_activity_limit")]
    pub activity_limit: u32,
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_activity_limit() -> u32 {
    20
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            activity_limit: default_activity_limit(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session flag file. Defaults to `~/.mission-control/session.json`.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorConfig {
    /// Author label attached to instructions posted from this client.
    #[serde(default = "default_operator_author")]
    pub author: String,
}

fn default_operator_author() -> String {
    "khayal".to_string()
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            author: default_operator_author(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr. Ignored while the TUI owns the terminal.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "mission_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    /// Redraw tick in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    #[serde(default = "default_show_splash")]
    pub show_splash: bool,

    #[serde(default = "default_splash_duration_ms")]
    pub splash_duration_ms: u64,
}

fn default_tick_ms() -> u64 {
    250
}

fn default_show_splash() -> bool {
    true
}

fn default_splash_duration_ms() -> u64 {
    800
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            show_splash: default_show_splash(),
            splash_duration_ms: default_splash_duration_ms(),
        }
    }
}
