//! Cookie pool repository
//!
//! Entries are addressed by position in `created_at` order.

use mongodb::bson::{self, doc};

use super::{decode_all, DbError, COOKIES};
use crate::models::{CookieCredential, CookieInput};
use crate::store::{FindOptions, SortOrder, StoreConnection};

pub struct CookieRepo<'a> {
    conn: &'a dyn StoreConnection,
}

impl<'a> CookieRepo<'a> {
    pub fn new(conn: &'a dyn StoreConnection) -> Self {
        Self { conn }
    }

    /// Pool in position order.
    pub async fn list(&self) -> Result<Vec<CookieCredential>, DbError> {
        let docs = self
            .conn
            .find(
                COOKIES,
                doc! {},
                FindOptions::new().sort("created_at", SortOrder::Ascending),
            )
            .await?;
        Ok(decode_all(COOKIES, docs))
    }

    /// Append credentials, preserving their submitted order.
    pub async fn append(&self, inputs: Vec<CookieInput>) -> Result<usize, DbError> {
        let base = bson::DateTime::now().timestamp_millis();
        let mut added = 0;
        for (i, input) in inputs.into_iter().enumerate() {
            // Distinct millis keep position order stable within one import
            let created_at = bson::DateTime::from_millis(base + i as i64);
            self.conn
                .insert_one(COOKIES, input.into_document(created_at))
                .await?;
            added += 1;
        }
        Ok(added)
    }

    /// Delete the entry at `index`; later entries move up one position.
    pub async fn remove_at(&self, index: usize) -> Result<(), DbError> {
        let not_found = || DbError::NotFound {
            resource: "cookie",
            id: index.to_string(),
        };

        let docs = self
            .conn
            .find(
                COOKIES,
                doc! {},
                FindOptions::new()
                    .sort("created_at", SortOrder::Ascending)
                    .skip(index as u64)
                    .limit(1),
            )
            .await?;
        let id = docs
            .first()
            .and_then(|d| d.get("_id").cloned())
            .ok_or_else(not_found)?;

        let deleted = self.conn.delete_one(COOKIES, doc! { "_id": id }).await?;
        if deleted == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    pub async fn clear(&self) -> Result<u64, DbError> {
        Ok(self.conn.delete_many(COOKIES, doc! {}).await?)
    }
}
