use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("authentication required: no bearer token available")]
    NotAuthenticated,

    #[error("remote request failed{}: {message}", status_suffix(.status))]
    RemoteFailure {
        status: Option<u16>,
        message: String,
    },

    #[error("parse result {0} not found")]
    NotFound(u64),

    #[error("malformed cache entry {key}: {details}")]
    MalformedCache { key: String, details: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReviewError {
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::RemoteFailure {
            status,
            message: message.into(),
        }
    }

    pub fn is_remote_failure(&self) -> bool {
        matches!(self, Self::RemoteFailure { .. } | Self::NotFound(_))
    }
}

impl From<reqwest::Error> for ReviewError {
    fn from(error: reqwest::Error) -> Self {
        Self::RemoteFailure {
            status: error.status().map(|status| status.as_u16()),
            message: error.to_string(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" ({code})")).unwrap_or_default()
}

pub type Result<T, E = ReviewError> = std::result::Result<T, E>;
