use thiserror::Error;

/// Transport-level error taxonomy for calls against the platform API.
///
/// Server messages are carried verbatim; business-rule classification on top
/// of them belongs to the consuming cell.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {message}")]
    Conflict {
        code: Option<String>,
        message: String,
    },

    /// Any other failure envelope from the server (4xx).
    #[error("Rejected: {message}")]
    Rejected {
        code: Option<String>,
        message: String,
    },

    #[error("Server error: {0}")]
    Server(String),

    /// The response did not match the documented envelope.
    #[error("Contract violation: {0}")]
    Contract(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl ApiError {
    /// Structured error code supplied by the server, when present.
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Conflict { code, .. } | ApiError::Rejected { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// The server's message, verbatim, where one exists.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Auth(msg)
            | ApiError::NotFound(msg)
            | ApiError::Server(msg)
            | ApiError::Conflict { message: msg, .. }
            | ApiError::Rejected { message: msg, .. } => Some(msg),
            ApiError::Contract(_) | ApiError::Transport(_) => None,
        }
    }
}
