use std::path::{Path, PathBuf};

use super::types::AppConfig;

pub const ENV_API_URL: &str = "MISSION_CONTROL_API_URL";
pub const ENV_API_KEY: &str = "MISSION_CONTROL_API_KEY";

/// Get the default data directory: ~/.mission-control
pub fn get_data_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".mission-control"))
}

pub fn get_session_file_path(cfg: &AppConfig) -> anyhow::Result<PathBuf> {
    match cfg
        .session
        .path
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        Some(p) => Ok(PathBuf::from(p)),
        None => Ok(get_data_dir()?.join("session.json")),
    }
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.mission-control/config.toml (highest)
    let data_dir = get_data_dir()?;
    let home_config = data_dir.join("config.toml");

    // Priority 2: ./config.toml (current directory)
    let local_config = Path::new("config.toml");

    let mut cfg = if home_config.exists() {
        load_from_path(&home_config)?
    } else if local_config.exists() {
        load_from_path(local_config)?
    } else {
        AppConfig::default()
    };

    if cfg.logging.directory.is_none()
        || cfg
            .logging
            .directory
            .as_ref()
            .map(|s| s.trim().is_empty())
            .unwrap_or(false)
    {
        cfg.logging.directory = Some(data_dir.join("logs").to_string_lossy().to_string());
    }

    // Environment variable overrides (Priority 0: highest)
    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());

    Ok(cfg)
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)?;
    let cfg = toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))?;
    Ok(cfg)
}

pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup(ENV_API_URL) {
        if !v.trim().is_empty() {
            cfg.api.base_url = v;
        }
    }
    // An explicitly empty key is a valid override.
    if let Some(v) = lookup(ENV_API_KEY) {
        cfg.api.api_key = v;
    }
}
