use thiserror::Error;

/// Failure of a single read endpoint. Never fatal: the scheduler degrades the
/// affected slice and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn malformed(details: impl Into<String>) -> Self {
        FetchError::Malformed(details.into())
    }
}

/// Failure of the feedback write flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("{0}")]
    Validation(String),

    #[error("a submission is already in progress")]
    AlreadyInFlight,

    #[error("network error: {0}")]
    Network(String),

    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl SubmissionError {
    /// Text shown in the toast for this failure.
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::Network(_) => "Network error".to_string(),
            other => other.to_string(),
        }
    }
}
