use reqwest::StatusCode;
use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Failures talking to the weekly MOD service. `Display` is shown to the
/// operator as-is.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response; `message` is the body text or a status fallback.
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("expected a JSON body from {endpoint}")]
    MissingBody { endpoint: String },

    #[error("could not save download: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn from_status(status: StatusCode, body: String) -> Self {
        let message = if body.trim().is_empty() {
            format!(
                "HTTP Error: {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )
        } else {
            body
        };
        ApiError::Status { status, message }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FormError {
    #[error("week number must be between 1 and 53 (got {0})")]
    WeekOutOfRange(i64),

    #[error("week {0} already exists")]
    WeekExists(i64),

    #[error("row {row}: {message}")]
    InvalidRow { row: usize, message: String },
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] FormError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
