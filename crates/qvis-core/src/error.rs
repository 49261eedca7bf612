use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The retrieval backend failed for a leaf. An empty result is not an error.
    #[error("Retrieval failed for {node}: {message}")]
    Backend { node: String, message: String },

    #[error("Cache failure: {0}")]
    Cache(String),

    /// The query tree cannot be evaluated as given.
    #[error("Malformed query tree: {0}")]
    Structural(String),
}

pub type Result<T> = std::result::Result<T, Error>;
