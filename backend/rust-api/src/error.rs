use thiserror::Error;

/// Failure of a repository adapter call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("repository call timed out")]
    Timeout,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors surfaced to the caller of the engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Every tier, including the surprise pick, came back empty
    #[error("no content available for category {category_id}")]
    NoContentAvailable { category_id: String },
}
