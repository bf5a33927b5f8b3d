use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Agents,
    Tasks,
    TaskDetail(String),
}

impl Route {
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        match segments.as_slice() {
            [] => Some(Route::Dashboard),
            ["login"] => Some(Route::Login),
            ["agents"] => Some(Route::Agents),
            ["tasks"] => Some(Route::Tasks),
            ["tasks", id] => Some(Route::TaskDetail((*id).to_string())),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Dashboard => "/".to_string(),
            Route::Agents => "/agents".to_string(),
            Route::Tasks => "/tasks".to_string(),
            Route::TaskDetail(id) => format!("/tasks/{id}"),
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login)
    }

    /// Where a page lands after its own session check on mount.
    pub fn resolve(self, session: &Session) -> Route {
        if self.requires_auth() && !session.is_authenticated() {
            tracing::debug!(target: "mission.routes", from = %self.path(), "redirecting to login");
            Route::Login
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Login page, framework internals and API routes.
    Public,
    /// Let through; the page checks the session itself after mount.
    Deferred,
}

impl GateDecision {
    /// The static gate never blocks a request.
    pub fn allows(self) -> bool {
        true
    }
}

const PUBLIC_PREFIXES: [&str; 3] = ["/login", "/_next", "/api"];

/// Request-level access guard. Classifies a path but always lets it through.
pub fn access_guard(path: &str) -> GateDecision {
    if PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p)) {
        GateDecision::Public
    } else {
        GateDecision::Deferred
    }
}
