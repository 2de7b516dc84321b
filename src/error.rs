use thiserror::Error;

pub type Result<T> = std::result::Result<T, CasError>;

/// Hard errors raised at the boxing and pattern-loading boundaries. A failed
/// match is never an error; it flows back to the caller as `None`.
#[derive(Debug, Error)]
pub enum CasError {
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("invalid construction: {0}")]
    InvalidConstruction(String),
}
