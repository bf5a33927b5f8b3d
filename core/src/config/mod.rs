mod load;
mod types;

pub use load::{
    apply_env_overrides, get_data_dir, get_session_file_path, load_default, load_from_path,
    ENV_API_KEY, ENV_API_URL,
};
pub use types::{
    ApiConfig, AppConfig, LoggingConfig, OperatorConfig, PollConfig, SessionConfig, TuiConfig,
    DEFAULT_BASE_URL,
};
