//! Data connector for the external table platform
//!
//! Serves any collection as pages of flat string records:
//! - [`role`] decides the column set once per request
//! - [`shaper`] renders one document per variant
//! - [`cursor`] pages with a skip-offset token

pub mod cursor;
pub mod protocol;
pub mod role;
pub mod shaper;

pub use cursor::{decode_token, page, Page, ShapedRecord, CONNECTOR_PAGE_SIZE};
pub use role::{CollectionRole, FieldSpec};
pub use shaper::{shape, Record};

use crate::models::Bvid;
use crate::repos::VideoRepo;
use crate::store::StoreConnection;

/// Name shown for a collection on the consumer side.
///
/// Comment collections are titled after their video; if the metadata lookup
/// fails or finds no title the raw collection name is used instead.
pub async fn display_name(conn: &dyn StoreConnection, collection: &str) -> String {
    let role = CollectionRole::resolve(collection);
    if let Some(name) = role.fixed_display_name() {
        return name.to_owned();
    }

    let Some(bvid) = Bvid::from_collection_name(collection) else {
        return collection.to_owned();
    };

    match VideoRepo::new(conn).title(&bvid).await {
        Ok(Some(title)) => title,
        Ok(None) => collection.to_owned(),
        Err(e) => {
            tracing::warn!(collection, error = %e, "title lookup failed, using collection name");
            collection.to_owned()
        }
    }
}

/// Column schema plus display name for `/table_meta`
pub async fn table_meta(conn: &dyn StoreConnection, collection: &str) -> protocol::TableMeta {
    let role = CollectionRole::resolve(collection);
    protocol::TableMeta {
        table_name: display_name(conn, collection).await,
        fields: role.fields().iter().map(protocol::FieldDef::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::VIDEO_METADATA;
    use crate::store::{Bson, Document, DocumentStore, FindOptions, MemoryStore, StoreError};
    use async_trait::async_trait;
    use mongodb::bson::doc;

    /// Connection whose every query fails
    struct Broken;

    #[async_trait]
    impl StoreConnection for Broken {
        async fn find(&self, _: &str, _: Document, _: FindOptions) -> Result<Vec<Document>, StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }
        async fn count(&self, _: &str, _: Document) -> Result<u64, StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }
        async fn insert_one(&self, _: &str, _: Document) -> Result<Bson, StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }
        async fn update_one(&self, _: &str, _: Document, _: Document) -> Result<u64, StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }
        async fn delete_one(&self, _: &str, _: Document) -> Result<u64, StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }
        async fn delete_many(&self, _: &str, _: Document) -> Result<u64, StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }
        async fn list_collections(&self) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }
    }

    #[tokio::test]
    async fn comment_collection_uses_video_title() {
        let store = MemoryStore::new();
        store
            .seed(VIDEO_METADATA, vec![doc! { "bvid": "BV1a", "title": "猫猫视频" }])
            .await;
        let conn = store.connect().await.unwrap();
        assert_eq!(display_name(conn.as_ref(), "comments_BV1a").await, "猫猫视频");
    }

    #[tokio::test]
    async fn falls_back_to_collection_name() {
        let store = MemoryStore::new();
        let conn = store.connect().await.unwrap();
        assert_eq!(display_name(conn.as_ref(), "comments_BV1a").await, "comments_BV1a");
        assert_eq!(display_name(conn.as_ref(), "scratch").await, "scratch");
    }

    #[tokio::test]
    async fn lookup_failure_never_aborts() {
        assert_eq!(display_name(&Broken, "comments_BV1a").await, "comments_BV1a");
        let meta = table_meta(&Broken, "comments_BV1a").await;
        assert_eq!(meta.table_name, "comments_BV1a");
        assert_eq!(meta.fields.len(), CollectionRole::Comments.fields().len());
    }

    #[tokio::test]
    async fn fixed_names_for_other_roles() {
        assert_eq!(display_name(&Broken, "video_stats").await, "视频数据");
        let meta = table_meta(&Broken, "monitor_config").await;
        assert!(meta.fields.iter().any(|f| f.field_id == "fetch_replies"));
        assert_eq!(meta.fields.iter().filter(|f| f.is_primary).count(), 1);
    }
}
