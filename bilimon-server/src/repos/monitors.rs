//! Monitor configuration repository
//!
//! - create: rejects a bvid that is already monitored (no overwrite)
//! - update: `$set` of the supplied fields only
//! - remove: NotFound when nothing matched

use mongodb::bson::doc;

use super::{decode_all, DbError, MONITOR_CONFIG};
use crate::models::{Bvid, MonitorConfig, MonitorPatch};
use crate::store::{FindOptions, SortOrder, StoreConnection, StoreError};

pub struct MonitorRepo<'a> {
    conn: &'a dyn StoreConnection,
}

impl<'a> MonitorRepo<'a> {
    pub fn new(conn: &'a dyn StoreConnection) -> Self {
        Self { conn }
    }

    /// Newest monitors first.
    pub async fn list(&self) -> Result<Vec<MonitorConfig>, DbError> {
        let docs = self
            .conn
            .find(
                MONITOR_CONFIG,
                doc! {},
                FindOptions::new().sort("created_at", SortOrder::Descending),
            )
            .await?;
        Ok(decode_all(MONITOR_CONFIG, docs))
    }

    pub async fn get(&self, bvid: &Bvid) -> Result<MonitorConfig, DbError> {
        let docs = self
            .conn
            .find(MONITOR_CONFIG, doc! { "bvid": bvid.as_str() }, FindOptions::new().limit(1))
            .await?;
        decode_all(MONITOR_CONFIG, docs)
            .pop()
            .ok_or_else(|| DbError::NotFound {
                resource: "monitor",
                id: bvid.to_string(),
            })
    }

    pub async fn create(&self, monitor: MonitorConfig) -> Result<MonitorConfig, DbError> {
        let conflict = || DbError::Conflict {
            resource: "monitor",
            id: monitor.bvid.clone(),
        };

        let existing = self
            .conn
            .count(MONITOR_CONFIG, doc! { "bvid": monitor.bvid.as_str() })
            .await?;
        if existing > 0 {
            return Err(conflict());
        }

        // A unique index on bvid turns a lost race into a duplicate key error
        match self.conn.insert_one(MONITOR_CONFIG, monitor.to_document()).await {
            Ok(_) => Ok(monitor),
            Err(StoreError::Backend(msg)) if msg.contains("E11000") => Err(conflict()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update(&self, bvid: &Bvid, patch: &MonitorPatch) -> Result<MonitorConfig, DbError> {
        let matched = self
            .conn
            .update_one(
                MONITOR_CONFIG,
                doc! { "bvid": bvid.as_str() },
                patch.to_set_document(),
            )
            .await?;
        if matched == 0 {
            return Err(DbError::NotFound {
                resource: "monitor",
                id: bvid.to_string(),
            });
        }
        self.get(bvid).await
    }

    pub async fn remove(&self, bvid: &Bvid) -> Result<(), DbError> {
        let deleted = self
            .conn
            .delete_one(MONITOR_CONFIG, doc! { "bvid": bvid.as_str() })
            .await?;
        if deleted == 0 {
            return Err(DbError::NotFound {
                resource: "monitor",
                id: bvid.to_string(),
            });
        }
        Ok(())
    }
}
