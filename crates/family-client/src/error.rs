use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),

    #[error("User details missing. Please log in again.")]
    NotLoggedIn,

    /// The server answered with an error status. `message` is the server's
    /// own message when it sent one, otherwise a per-operation fallback.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Could not reach the server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Session file error: {0}")]
    Session(#[from] std::io::Error),

    #[error("Session file is corrupt: {0}")]
    SessionFormat(#[from] serde_json::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
