//! Stats snapshot repository

use mongodb::bson::doc;

use super::{decode_all, DbError, VIDEO_STATS};
use crate::models::{Bvid, StatsSnapshot};
use crate::store::{FindOptions, SortOrder, StoreConnection};

pub struct StatsRepo<'a> {
    conn: &'a dyn StoreConnection,
}

impl<'a> StatsRepo<'a> {
    pub fn new(conn: &'a dyn StoreConnection) -> Self {
        Self { conn }
    }

    /// Newest snapshots for one video.
    pub async fn latest(&self, bvid: &Bvid, limit: i64) -> Result<Vec<StatsSnapshot>, DbError> {
        let docs = self
            .conn
            .find(
                VIDEO_STATS,
                doc! { "bvid": bvid.as_str() },
                FindOptions::new()
                    .sort("timestamp", SortOrder::Descending)
                    .limit(limit),
            )
            .await?;
        Ok(decode_all(VIDEO_STATS, docs))
    }
}
