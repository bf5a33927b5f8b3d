use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),
    #[error("not logged in; run `mission-control login` first")]
    NotAuthenticated,
    #[error("{0}")]
    Api(#[from] ApiError),
    /// A user action failed; `context` is the action's failure message.
    #[error("{context}: {source}")]
    Action {
        context: &'static str,
        #[source]
        source: ApiError,
    },
    #[error("command failed: {0}")]
    Command(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Timeout,
    Connect,
    Request,
    Body,
    Unknown,
}

impl TransportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Unknown => "unknown",
        }
    }

    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect
        } else if err.is_request() {
            Self::Request
        } else if err.is_body() {
            Self::Body
        } else {
            Self::Unknown
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("instruction text is empty")]
    EmptyInstruction,
    #[error("task not found: {0}")]
    TaskNotFound(String),
}

#[derive(Error, Debug, Clone)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("{kind} error for {url}: {message}")]
    Transport {
        kind: TransportKind,
        url: String,
        message: String,
    },
    /// Non-2xx response. `message` is the backend's `error` field or `HTTP <status>`.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("invalid {entity} record: {message}")]
    Invalid {
        entity: &'static str,
        message: String,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ApiError {
    pub fn transport(err: &reqwest::Error, url: &str) -> Self {
        ApiError::Transport {
            kind: TransportKind::classify(err),
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }
}
