//! Error types for process-queue.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The item's id is not a usable identifier (e.g. an empty string).
    #[error("invalid queue item: {0}")]
    Validation(String),

    /// The pending sequence already holds `max_size` items.
    #[error("queue size limit reached ({max_size} items)")]
    Capacity { max_size: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
