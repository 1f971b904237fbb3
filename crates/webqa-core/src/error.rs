use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Embedding failed: {0}")]
    Embedding(#[source] anyhow::Error),

    #[error("Loading document failed: {0}")]
    Load(#[source] anyhow::Error),

    #[error("Answer generation failed: {0}")]
    Generation(#[source] anyhow::Error),

    #[error("Pipeline has no index yet; build it before asking questions")]
    NotReady,
}

pub type Result<T> = std::result::Result<T, Error>;
