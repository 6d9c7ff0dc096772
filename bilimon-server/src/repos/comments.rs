//! Comment repository
//!
//! One collection per video, named by [`Bvid::collection_name`].

use mongodb::bson::doc;

use super::{decode_all, DbError};
use crate::models::{Bvid, Comment};
use crate::store::{FindOptions, SortOrder, StoreConnection};

/// A window of comments plus the collection's exact size
#[derive(Debug)]
pub struct CommentPage {
    pub total: u64,
    pub comments: Vec<Comment>,
}

pub struct CommentRepo<'a> {
    conn: &'a dyn StoreConnection,
}

impl<'a> CommentRepo<'a> {
    pub fn new(conn: &'a dyn StoreConnection) -> Self {
        Self { conn }
    }

    /// Newest comments first, skipping `offset`.
    pub async fn page(&self, bvid: &Bvid, limit: i64, offset: u64) -> Result<CommentPage, DbError> {
        let collection = bvid.collection_name();
        let total = self.conn.count(&collection, doc! {}).await?;
        let comments = self.newest(&collection, limit, offset).await?;
        Ok(CommentPage { total, comments })
    }

    pub async fn latest(&self, bvid: &Bvid, limit: i64) -> Result<Vec<Comment>, DbError> {
        self.newest(&bvid.collection_name(), limit, 0).await
    }

    async fn newest(&self, collection: &str, limit: i64, offset: u64) -> Result<Vec<Comment>, DbError> {
        let docs = self
            .conn
            .find(
                collection,
                doc! {},
                FindOptions::new()
                    .sort("ctime", SortOrder::Descending)
                    .skip(offset)
                    .limit(limit),
            )
            .await?;
        Ok(decode_all(collection, docs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DocumentStore, MemoryStore};

    #[tokio::test]
    async fn page_counts_everything_and_returns_window() {
        let store = MemoryStore::new();
        store
            .seed(
                "comments_BV1a",
                (1..=5).map(|i| doc! { "rpid": (i as i64), "ctime": (1_000 + i as i64), "user": "u" }),
            )
            .await;
        let conn = store.connect().await.unwrap();
        let bvid = Bvid::extract("BV1a").unwrap();

        let page = CommentRepo::new(conn.as_ref()).page(&bvid, 2, 1).await.unwrap();
        assert_eq!(page.total, 5);
        let rpids: Vec<i64> = page.comments.iter().map(|c| c.rpid).collect();
        assert_eq!(rpids, vec![4, 3]);
    }

    #[tokio::test]
    async fn unknown_video_is_empty() {
        let store = MemoryStore::new();
        let conn = store.connect().await.unwrap();
        let bvid = Bvid::extract("BV1none").unwrap();
        let page = CommentRepo::new(conn.as_ref()).page(&bvid, 20, 0).await.unwrap();
        assert_eq!(page.total, 0);
        assert!(page.comments.is_empty());
    }
}
