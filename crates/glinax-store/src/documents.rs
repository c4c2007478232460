use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;
use surrealdb::sql::Datetime as SurrealDatetime;
use surrealdb::Surreal;
use tokio::sync::OnceCell;

use crate::error::PersistenceError;
use crate::Result;

/// A document collection and the name of its natural key field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collection {
    pub name: &'static str,
    pub key_field: &'static str,
}

impl Collection {
    pub const UNIVERSITIES: Self = Self {
        name: "universities_data",
        key_field: "university_code",
    };
    pub const SCHOLARSHIPS: Self = Self {
        name: "scholarships_data",
        key_field: "scholarship_id",
    };
    pub const CUT_OFF_POINTS: Self = Self {
        name: "cut_off_points",
        key_field: "academic_year",
    };
}

/// Rows of one collection, keyed by their natural key.
pub type Rows = Vec<(String, serde_json::Value)>;

/// Where documents get upserted.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Upserts the rows of every collection in one transaction: either all
    /// rows land or none does.
    async fn upsert_batch(&self, batch: Vec<(Collection, Rows)>) -> Result<()>;

    async fn upsert_all(&self, collection: Collection, rows: Rows) -> Result<()> {
        self.upsert_batch(vec![(collection, rows)]).await
    }
}

/// Configuration for the SurrealDB connection
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Endpoint, the scheme selects the engine (`ws://`, `wss://`, `mem://`)
    pub uri: String,
    /// Namespace (default: "glinax")
    pub namespace: String,
    /// Database name (default: "glinax_chatbot_db")
    pub database: String,
    /// Optional root credentials
    pub credentials: Option<(String, String)>,
}

impl StoreConfig {
    pub const DEFAULT_NAMESPACE: &'static str = "glinax";
    pub const DEFAULT_DATABASE: &'static str = "glinax_chatbot_db";

    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            namespace: Self::DEFAULT_NAMESPACE.to_string(),
            database: Self::DEFAULT_DATABASE.to_string(),
            credentials: None,
        }
    }

    /// Throwaway store living in process memory
    pub fn in_memory() -> Self {
        Self::new("mem://")
    }

    pub fn with_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = ns.into();
        self
    }

    pub fn with_database(mut self, db: impl Into<String>) -> Self {
        self.database = db.into();
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }
}

/// A row as read back from the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub key: String,
    pub data: serde_json::Value,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct DbRow {
    key: String,
    data: serde_json::Value,
    last_updated: SurrealDatetime,
}

impl From<DbRow> for StoredDocument {
    fn from(row: DbRow) -> Self {
        Self {
            key: row.key,
            data: row.data,
            last_updated: DateTime::<Utc>::from(row.last_updated),
        }
    }
}

/// SurrealDB document store, connected on first use
pub struct DocumentStore {
    config: StoreConfig,
    db: OnceCell<Surreal<Any>>,
}

impl DocumentStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    async fn db(&self) -> Result<&Surreal<Any>> {
        self.db.get_or_try_init(|| connect(&self.config)).await
    }

    /// Every row of `collection`, ordered by key.
    pub async fn documents(&self, collection: Collection) -> Result<Vec<StoredDocument>> {
        let mut response = self
            .db()
            .await?
            .query("SELECT meta::id(id) AS key, data, last_updated FROM type::table($table) ORDER BY key")
            .bind(("table", collection.name.to_string()))
            .await?;

        let rows: Vec<DbRow> = response.take(0)?;
        Ok(rows.into_iter().map(StoredDocument::from).collect())
    }

    /// The row stored under `key`, if any.
    pub async fn document(&self, collection: Collection, key: &str) -> Result<Option<StoredDocument>> {
        let mut response = self
            .db()
            .await?
            .query("SELECT meta::id(id) AS key, data, last_updated FROM type::thing($table, $key)")
            .bind(("table", collection.name.to_string()))
            .bind(("key", key.to_string()))
            .await?;

        let rows: Vec<DbRow> = response.take(0)?;
        Ok(rows.into_iter().next().map(StoredDocument::from))
    }
}

async fn connect(config: &StoreConfig) -> Result<Surreal<Any>> {
    log::info!("Connecting to document store at {}", config.uri);

    let db = surrealdb::engine::any::connect(config.uri.as_str())
        .await
        .map_err(|e| {
            PersistenceError::Connection(format!("Failed to connect to {}: {}", config.uri, e))
        })?;

    if let Some((username, password)) = &config.credentials {
        db.signin(Root {
            username: username.as_str(),
            password: password.as_str(),
        })
        .await
        .map_err(|e| PersistenceError::Connection(format!("Root authentication failed: {}", e)))?;
    }

    db.use_ns(config.namespace.as_str())
        .use_db(config.database.as_str())
        .await
        .map_err(|e| {
            PersistenceError::Connection(format!("Failed to select namespace/database: {}", e))
        })?;

    Ok(db)
}

#[async_trait]
impl DocumentSink for DocumentStore {
    async fn upsert_batch(&self, batch: Vec<(Collection, Rows)>) -> Result<()> {
        let count: usize = batch.iter().map(|(_, rows)| rows.len()).sum();
        if count == 0 {
            return Ok(());
        }

        let mut sql = String::from("BEGIN TRANSACTION;\n");
        for (c, (collection, rows)) in batch.iter().enumerate() {
            for i in 0..rows.len() {
                sql.push_str(&format!(
                    "UPSERT type::thing($table{c}, $key{c}_{i}) SET {field} = $key{c}_{i}, data = $data{c}_{i}, last_updated = time::now();\n",
                    field = collection.key_field,
                ));
            }
        }
        sql.push_str("COMMIT TRANSACTION;");

        let mut query = self.db().await?.query(sql);
        let names: Vec<&str> = batch.iter().map(|(collection, _)| collection.name).collect();
        for (c, (collection, rows)) in batch.into_iter().enumerate() {
            query = query.bind((format!("table{c}"), collection.name.to_string()));
            for (i, (key, data)) in rows.into_iter().enumerate() {
                query = query
                    .bind((format!("key{c}_{i}"), key))
                    .bind((format!("data{c}_{i}"), data));
            }
        }

        query.await?.check()?;
        log::debug!("Upserted {count} rows into {}", names.join(", "));
        Ok(())
    }
}
