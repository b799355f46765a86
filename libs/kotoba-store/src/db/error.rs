//! Database error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("word not found: {0}")]
    WordNotFound(String),

    #[error("card not found: {0}")]
    CardNotFound(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}
