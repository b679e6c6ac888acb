use thiserror::Error;

pub type InsightResult<T> = Result<T, InsightError>;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Unsupported domain: {0}")]
    UnknownDomain(String),

    #[error("Transaction validation error: {0}")]
    Validation(String),

    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
