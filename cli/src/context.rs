use std::sync::Arc;

use mission_core::api::{AppConfig, CliError, MissionApi, Session};

/// Everything a command or the TUI needs: config, the session gate and the API.
pub struct AppContext {
    pub cfg: AppConfig,
    pub session: Session,
    pub api: Arc<dyn MissionApi>,
}

impl AppContext {
    pub fn new(cfg: AppConfig, session: Session, api: Arc<dyn MissionApi>) -> Self {
        Self { cfg, session, api }
    }

    /// The one-shot commands apply the same gate as the protected pages.
    pub fn require_session(&self) -> Result<(), CliError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(CliError::NotAuthenticated)
        }
    }
}
