//! Video metadata repository
//!
//! Read-only: the crawler owns these documents.

use mongodb::bson::{self, doc};

use super::{decode_all, DbError, VIDEO_METADATA};
use crate::models::{Bvid, VideoMetadata};
use crate::store::{FindOptions, SortOrder, StoreConnection};

pub struct VideoRepo<'a> {
    conn: &'a dyn StoreConnection,
}

impl<'a> VideoRepo<'a> {
    pub fn new(conn: &'a dyn StoreConnection) -> Self {
        Self { conn }
    }

    /// Most recently updated videos first.
    pub async fn latest(&self, limit: i64) -> Result<Vec<VideoMetadata>, DbError> {
        let docs = self
            .conn
            .find(
                VIDEO_METADATA,
                doc! {},
                FindOptions::new()
                    .sort("last_updated", SortOrder::Descending)
                    .limit(limit),
            )
            .await?;
        Ok(decode_all(VIDEO_METADATA, docs))
    }

    pub async fn get(&self, bvid: &Bvid) -> Result<VideoMetadata, DbError> {
        let not_found = || DbError::NotFound {
            resource: "video",
            id: bvid.to_string(),
        };

        let doc = self
            .conn
            .find_one(VIDEO_METADATA, doc! { "bvid": bvid.as_str() })
            .await?
            .ok_or_else(not_found)?;

        bson::from_document(doc).map_err(|e| {
            tracing::warn!(bvid = %bvid, error = %e, "malformed video metadata");
            not_found()
        })
    }

    /// Title stored for a video, if any.
    pub async fn title(&self, bvid: &Bvid) -> Result<Option<String>, DbError> {
        let doc = self
            .conn
            .find_one(VIDEO_METADATA, doc! { "bvid": bvid.as_str() })
            .await?;
        Ok(doc
            .and_then(|d| d.get_str("title").ok().map(str::to_owned))
            .filter(|t| !t.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DocumentStore, MemoryStore};

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .seed(
                VIDEO_METADATA,
                vec![
                    doc! { "bvid": "BV1old", "title": "old", "last_updated": bson::DateTime::from_millis(1_000) },
                    doc! { "bvid": "BV1new", "title": "new", "last_updated": bson::DateTime::from_millis(9_000) },
                    doc! { "bvid": "BV1untitled", "title": "" },
                ],
            )
            .await;
        store
    }

    #[tokio::test]
    async fn latest_is_newest_first() {
        let store = seeded().await;
        let conn = store.connect().await.unwrap();
        let videos = VideoRepo::new(conn.as_ref()).latest(2).await.unwrap();
        let ids: Vec<_> = videos.iter().map(|v| v.bvid.as_str()).collect();
        assert_eq!(ids, vec!["BV1new", "BV1old"]);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = seeded().await;
        let conn = store.connect().await.unwrap();
        let bvid = Bvid::extract("BV1missing").unwrap();
        let err = VideoRepo::new(conn.as_ref()).get(&bvid).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "video", .. }));
    }

    #[tokio::test]
    async fn empty_title_is_none() {
        let store = seeded().await;
        let conn = store.connect().await.unwrap();
        let repo = VideoRepo::new(conn.as_ref());
        let untitled = Bvid::extract("BV1untitled").unwrap();
        assert_eq!(repo.title(&untitled).await.unwrap(), None);
        let new = Bvid::extract("BV1new").unwrap();
        assert_eq!(repo.title(&new).await.unwrap().as_deref(), Some("new"));
    }
}
