//! Document store adapter
//!
//! # Design Principles
//!
//! - One connection per request: [`DocumentStore::connect`] hands out a
//!   [`StoreConnection`] that is released when dropped, on every exit path
//! - Single-document writes only, no multi-document transactions
//! - Filters are equality documents, updates are `$set` partial merges
//! - Handlers receive the store through `AppState`, never a global, so tests
//!   run against [`MemoryStore`]

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
pub use mongodb::bson::{doc, Bson, Document};

pub use memory::MemoryStore;
pub use mongo::{MongoStore, DEFAULT_DATABASE};

/// Store error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database not configured: {0}")]
    NotConfigured(String),

    #[error("database error: {0}")]
    Backend(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        Self::Backend(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

/// Cursor modifiers for [`StoreConnection::find`]
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub sort: Option<(String, SortOrder)>,
    pub skip: u64,
    pub limit: Option<i64>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }

    pub fn skip(mut self, n: u64) -> Self {
        self.skip = n;
        self
    }

    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }
}

/// Opens request-scoped connections
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn StoreConnection>, StoreError>;
}

/// One open connection to the logical database
#[async_trait]
pub trait StoreConnection: Send + Sync {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError>;

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, StoreError> {
        let mut docs = self
            .find(collection, filter, FindOptions::new().limit(1))
            .await?;
        Ok(docs.pop())
    }

    /// Exact document count
    async fn count(&self, collection: &str, filter: Document) -> Result<u64, StoreError>;

    /// Insert a document, returning its `_id`
    async fn insert_one(&self, collection: &str, document: Document) -> Result<Bson, StoreError>;

    /// `$set` the given fields on the first match, returning the matched count
    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
    ) -> Result<u64, StoreError>;

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64, StoreError>;

    async fn delete_many(&self, collection: &str, filter: Document) -> Result<u64, StoreError>;

    async fn list_collections(&self) -> Result<Vec<String>, StoreError>;
}

/// Stand-in used when no connection string was configured.
///
/// The server still starts; every store-backed request reports the missing
/// configuration instead.
pub struct UnconfiguredStore {
    reason: String,
}

impl UnconfiguredStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl DocumentStore for UnconfiguredStore {
    async fn connect(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        Err(StoreError::NotConfigured(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_options_builder() {
        let opts = FindOptions::new()
            .sort("ctime", SortOrder::Descending)
            .skip(40)
            .limit(20);
        assert_eq!(opts.sort, Some(("ctime".to_string(), SortOrder::Descending)));
        assert_eq!(opts.skip, 40);
        assert_eq!(opts.limit, Some(20));
    }

    #[tokio::test]
    async fn unconfigured_store_refuses_connections() {
        let store = UnconfiguredStore::new("MONGODB_URI is not set");
        let err = store.connect().await.err().expect("connect should fail");
        assert!(matches!(err, StoreError::NotConfigured(_)));
        assert!(err.to_string().contains("MONGODB_URI"));
    }
}
