//! MongoDB-backed store
//!
//! Each [`MongoStore::connect`] builds its own client; the client (and its
//! sockets) go away with the returned connection.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Database};

use super::{DocumentStore, FindOptions, StoreConnection, StoreError};

/// Default logical database name
pub const DEFAULT_DATABASE: &str = "bilibili_monitor";

pub struct MongoStore {
    uri: String,
    database: String,
}

impl MongoStore {
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
        }
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn connect(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        let client = Client::with_uri_str(&self.uri).await?;
        let db = client.database(&self.database);
        tracing::debug!(database = %self.database, "mongodb connection opened");
        Ok(Box::new(MongoConnection { _client: client, db }))
    }
}

struct MongoConnection {
    // Held so the driver's pool lives exactly as long as this connection
    _client: Client,
    db: Database,
}

impl MongoConnection {
    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.db.collection::<Document>(name)
    }
}

#[async_trait]
impl StoreConnection for MongoConnection {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let coll = self.collection(collection);
        let mut action = coll.find(filter);
        if let Some((field, order)) = options.sort {
            let mut sort = Document::new();
            sort.insert(field, order.as_i32());
            action = action.sort(sort);
        }
        if options.skip > 0 {
            action = action.skip(options.skip);
        }
        if let Some(limit) = options.limit {
            action = action.limit(limit);
        }

        let cursor = action.await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count(&self, collection: &str, filter: Document) -> Result<u64, StoreError> {
        Ok(self.collection(collection).count_documents(filter).await?)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<Bson, StoreError> {
        let result = self.collection(collection).insert_one(document).await?;
        Ok(result.inserted_id)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
    ) -> Result<u64, StoreError> {
        let result = self
            .collection(collection)
            .update_one(filter, doc! { "$set": set })
            .await?;
        Ok(result.matched_count)
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64, StoreError> {
        Ok(self.collection(collection).delete_one(filter).await?.deleted_count)
    }

    async fn delete_many(&self, collection: &str, filter: Document) -> Result<u64, StoreError> {
        Ok(self.collection(collection).delete_many(filter).await?.deleted_count)
    }

    async fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.db.list_collection_names().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Integration tests require a real MongoDB
    // Run with: MONGODB_URI=mongodb://... cargo test -p bilimon-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn insert_find_delete_round() {
        let uri = std::env::var("MONGODB_URI").expect("MONGODB_URI required");
        let store = MongoStore::new(uri, "bilimon_test");
        let conn = store.connect().await.expect("connect failed");

        conn.delete_many("store_smoke", doc! {}).await.expect("cleanup failed");
        conn.insert_one("store_smoke", doc! { "bvid": "BV1test", "n": 1 })
            .await
            .expect("insert failed");

        let found = conn
            .find_one("store_smoke", doc! { "bvid": "BV1test" })
            .await
            .expect("find failed");
        assert!(found.is_some());
        assert_eq!(conn.count("store_smoke", doc! {}).await.expect("count failed"), 1);

        let deleted = conn
            .delete_one("store_smoke", doc! { "bvid": "BV1test" })
            .await
            .expect("delete failed");
        assert_eq!(deleted, 1);
    }
}
