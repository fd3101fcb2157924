use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    #[error("Dependency group '{group}' was rejected")]
    Rejected { group: String },

    #[error("Failed to load {src}: {reason}")]
    Injection { src: String, reason: String },
}

pub type LoaderResult<T> = Result<T, LoaderError>;
