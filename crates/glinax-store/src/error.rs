use thiserror::Error;

/// Errors raised while writing a snapshot out
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Artifact could not be written
    #[error("Artifact write failed: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be turned into JSON
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database connection error
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// Database query error
    #[error("Database query failed: {0}")]
    Query(String),
}

impl From<surrealdb::Error> for PersistenceError {
    fn from(err: surrealdb::Error) -> Self {
        PersistenceError::Query(err.to_string())
    }
}
