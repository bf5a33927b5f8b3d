use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Idle,
    Active,
    Blocked,
}

impl AgentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Blocked => "blocked",
        }
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Agents report in once per 15-minute window, at `heartbeat_minute`.
pub const HEARTBEAT_WINDOW_MINUTES: u8 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub role: String,
    pub status: AgentStatus,
    #[serde(default)]
    pub current_task_id: Option<String>,
    pub session_key: String,
    pub heartbeat_minute: u8,
}

impl Agent {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.heartbeat_minute > 59 {
            return Err(ApiError::Invalid {
                entity: "agent",
                message: format!(
                    "agent {} has heartbeatMinute {} (expected 0-59)",
                    self.id, self.heartbeat_minute
                ),
            });
        }
        Ok(())
    }

    /// Minute-of-window label, e.g. `:07`.
    pub fn heartbeat_schedule(&self) -> String {
        format!(":{:02}", self.heartbeat_minute)
    }

    /// `Every 15min at :07`
    pub fn heartbeat_label(&self) -> String {
        format!(
            "Every {HEARTBEAT_WINDOW_MINUTES}min at {}",
            self.heartbeat_schedule()
        )
    }
}

/// Display name for an agent id, falling back to the id itself.
pub fn agent_display_name<'a>(agents: &'a [Agent], id: &'a str) -> &'a str {
    agents
        .iter()
        .find(|a| a.id == id)
        .map(|a| a.name.as_str())
        .unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(minute: u8) -> Agent {
        Agent {
            id: "jarvis".to_string(),
            name: "Jarvis".to_string(),
            role: "Squad Lead".to_string(),
            status: AgentStatus::Active,
            current_task_id: None,
            session_key: "agent:main:main".to_string(),
            heartbeat_minute: minute,
        }
    }

    #[test]
    fn heartbeat_schedule_is_zero_padded() {
        assert_eq!(agent(7).heartbeat_schedule(), ":07");
        assert_eq!(agent(0).heartbeat_schedule(), ":00");
        assert_eq!(agent(45).heartbeat_schedule(), ":45");
        assert_eq!(agent(7).heartbeat_label(), "Every 15min at :07");
    }

    #[test]
    fn validate_rejects_out_of_range_minute() {
        assert!(agent(59).validate().is_ok());
        let err = agent(60).validate().unwrap_err();
        assert!(matches!(err, ApiError::Invalid { entity: "agent", .. }));
    }

    #[test]
    fn decodes_camel_case_payload() {
        let a: Agent = serde_json::from_str(
            r#"{"id":"shuri","name":"Shuri","role":"Product Analyst","status":"blocked",
                "currentTaskId":"task-1","sessionKey":"agent:shuri:main","heartbeatMinute":2}"#,
        )
        .unwrap();
        assert_eq!(a.status, AgentStatus::Blocked);
        assert_eq!(a.current_task_id.as_deref(), Some("task-1"));
        assert_eq!(a.heartbeat_minute, 2);
    }

    #[test]
    fn unknown_status_is_a_decode_error() {
        let res = serde_json::from_str::<Agent>(
            r#"{"id":"x","name":"X","role":"r","status":"sleeping",
                "currentTaskId":null,"sessionKey":"k","heartbeatMinute":1}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let agents = vec![agent(1)];
        assert_eq!(agent_display_name(&agents, "jarvis"), "Jarvis");
        assert_eq!(agent_display_name(&agents, "friday"), "friday");
    }
}
