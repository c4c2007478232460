//! Durable storage for admissions snapshots.
//!
//! Two independent backends: pretty-printed JSON artifacts on disk, and a
//! SurrealDB document store where rows are upserted by natural key.

mod documents;
mod error;
mod files;

pub use documents::{Collection, DocumentSink, DocumentStore, Rows, StoreConfig, StoredDocument};
pub use error::PersistenceError;
pub use files::{ArtifactBatch, JsonArtifacts};

pub type Result<T> = std::result::Result<T, PersistenceError>;
