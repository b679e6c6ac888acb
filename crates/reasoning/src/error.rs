use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReasoningError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timed out after {0} ms")]
    Timeout(u64),

    #[error("Explainer panicked: {0}")]
    Panicked(String),
}

impl From<reqwest::Error> for ReasoningError {
    fn from(err: reqwest::Error) -> Self {
        ReasoningError::Network(err.to_string())
    }
}
