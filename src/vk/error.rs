use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Failures that keep a call from producing any response envelope.
///
/// Application errors reported inside the envelope (`error.error_code`) are
/// not represented here: the client logs them and returns `Ok(None)`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error (status {status}): {body}")]
    Http { status: u16, body: String },

    #[error("Client setup error: {0}")]
    Setup(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}
