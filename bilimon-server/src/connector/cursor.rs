//! Skip-based page cursor
//!
//! The token is the skip offset as a decimal string, `""` for the first
//! page. One extra document is fetched to learn whether another page exists,
//! so no page ever pays for a full collection count.

use mongodb::bson::doc;

use super::role::CollectionRole;
use super::shaper::{shape, Record};
use crate::store::{FindOptions, SortOrder, StoreConnection, StoreError};

/// Rows per connector page; the consumer rejects anything larger
pub const CONNECTOR_PAGE_SIZE: usize = 500;

/// A shaped row with its primary key pulled out
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedRecord {
    pub primary_id: String,
    pub data: Record,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub records: Vec<ShapedRecord>,
    pub next_token: String,
    pub has_more: bool,
}

/// Token to skip offset.
///
/// Anything that isn't a non-negative integer restarts from the first page.
pub fn decode_token(token: &str) -> u64 {
    let token = token.trim();
    if token.is_empty() {
        return 0;
    }
    token.parse().unwrap_or_else(|_| {
        tracing::debug!(token, "unparseable page token, restarting at offset 0");
        0
    })
}

pub fn encode_token(offset: u64) -> String {
    offset.to_string()
}

/// Fetch and shape one page of `collection`.
pub async fn page(
    conn: &dyn StoreConnection,
    collection: &str,
    token: &str,
    page_size: usize,
) -> Result<Page, StoreError> {
    let role = CollectionRole::resolve(collection);
    let offset = decode_token(token);
    let limit = i64::try_from(page_size.saturating_add(1)).unwrap_or(i64::MAX);

    let mut docs = conn
        .find(
            collection,
            doc! {},
            FindOptions::new()
                .sort(role.time_field(), SortOrder::Ascending)
                .skip(offset)
                .limit(limit),
        )
        .await?;

    let has_more = docs.len() > page_size;
    if has_more {
        docs.truncate(page_size);
    }
    let next_token = if has_more {
        encode_token(offset + docs.len() as u64)
    } else {
        String::new()
    };

    let records = docs
        .iter()
        .map(|d| {
            let data = shape(role, d);
            ShapedRecord {
                primary_id: data.get("id").cloned().unwrap_or_default(),
                data,
            }
        })
        .collect();

    tracing::debug!(collection, offset, has_more, "connector page served");
    Ok(Page {
        records,
        next_token,
        has_more,
    })
}
