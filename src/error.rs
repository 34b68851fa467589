//! Error types shared by every engine and the reconciliation layer

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Failure modes of a search or index operation.
///
/// Nothing here is retried locally: transport and backend errors surface to the
/// caller as-is, and retry policy belongs to whoever owns the hosted service.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    /// The backend could not be reached or the connection failed mid-request
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("{engine} returned HTTP {status}: {message}")]
    Backend {
        engine: String,
        status: u16,
        message: String,
    },

    /// The backend answered, but not with the document shape we expected
    #[error("malformed {engine} response: {detail}")]
    Parse { engine: String, detail: String },

    /// The primary datastore failed to load records
    #[error("datastore failure: {0}")]
    Datastore(String),

    /// Settings are missing or invalid for the selected driver
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The engine has no equivalent for the requested operation
    #[error("{engine} does not support {operation}")]
    Unsupported {
        engine: String,
        operation: &'static str,
    },
}

impl ScoutError {
    pub fn parse(engine: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Parse {
            engine: engine.into(),
            detail: detail.into(),
        }
    }

    pub fn unsupported(engine: impl Into<String>, operation: &'static str) -> Self {
        Self::Unsupported {
            engine: engine.into(),
            operation,
        }
    }

    /// Whether the failure happened before any answer came back
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<url::ParseError> for ScoutError {
    fn from(err: url::ParseError) -> Self {
        Self::Config(format!("invalid URL: {}", err))
    }
}
