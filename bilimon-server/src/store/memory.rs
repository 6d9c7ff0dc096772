//! In-process store for tests and `--memory` development mode
//!
//! Mirrors the subset of MongoDB semantics the server relies on: equality
//! filters, single-field sorts (missing < numbers < strings < ids < bools <
//! dates), skip/limit, and `$set` merges.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use tokio::sync::RwLock;

use super::{DocumentStore, FindOptions, SortOrder, StoreConnection, StoreError};

type Collections = HashMap<String, Vec<Document>>;

/// Shared in-memory database; clones see the same data
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
    open: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connections handed out and not yet dropped
    pub fn open_connections(&self) -> usize {
        self.open.load(AtomicOrdering::SeqCst)
    }

    /// Seed a collection directly, bypassing connections
    pub async fn seed(&self, collection: &str, documents: impl IntoIterator<Item = Document>) {
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection.to_owned()).or_default();
        for mut document in documents {
            ensure_id(&mut document);
            docs.push(document);
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn connect(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        self.open.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(Box::new(MemoryConnection {
            collections: Arc::clone(&self.collections),
            open: Arc::clone(&self.open),
        }))
    }
}

struct MemoryConnection {
    collections: Arc<RwLock<Collections>>,
    open: Arc<AtomicUsize>,
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.open.fetch_sub(1, AtomicOrdering::SeqCst);
    }
}

#[async_trait]
impl StoreConnection for MemoryConnection {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let guard = self.collections.read().await;
        let mut docs: Vec<Document> = guard
            .get(collection)
            .map(|docs| docs.iter().filter(|d| matches(d, &filter)).cloned().collect())
            .unwrap_or_default();

        if let Some((field, order)) = &options.sort {
            docs.sort_by(|a, b| {
                let ord = compare(a.get(field), b.get(field));
                match order {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                }
            });
        }

        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let iter = docs.into_iter().skip(skip);
        Ok(match options.limit {
            // MongoDB treats a negative limit like its absolute value
            Some(limit) if limit != 0 => iter.take(limit.unsigned_abs() as usize).collect(),
            _ => iter.collect(),
        })
    }

    async fn count(&self, collection: &str, filter: Document) -> Result<u64, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .map(|docs| docs.iter().filter(|d| matches(d, &filter)).count() as u64)
            .unwrap_or(0))
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<Bson, StoreError> {
        let id = ensure_id(&mut document);
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection.to_owned()).or_default();
        if docs.iter().any(|d| d.get("_id") == Some(&id)) {
            return Err(StoreError::Backend(format!(
                "E11000 duplicate key error collection: {collection} _id: {id}"
            )));
        }
        docs.push(document);
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        set: Document,
    ) -> Result<u64, StoreError> {
        let mut guard = self.collections.write().await;
        let Some(target) = guard
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| matches(d, &filter)))
        else {
            return Ok(0);
        };

        for (key, value) in set {
            target.insert(key, value);
        }
        Ok(1)
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64, StoreError> {
        let mut guard = self.collections.write().await;
        let Some(docs) = guard.get_mut(collection) else {
            return Ok(0);
        };
        match docs.iter().position(|d| matches(d, &filter)) {
            Some(idx) => {
                docs.remove(idx);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_many(&self, collection: &str, filter: Document) -> Result<u64, StoreError> {
        let mut guard = self.collections.write().await;
        let Some(docs) = guard.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| !matches(d, &filter));
        Ok((before - docs.len()) as u64)
    }

    async fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        let guard = self.collections.read().await;
        let mut names: Vec<String> = guard.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

fn ensure_id(document: &mut Document) -> Bson {
    if let Some(id) = document.get("_id") {
        return id.clone();
    }
    let id = Bson::ObjectId(ObjectId::new());
    document.insert("_id", id.clone());
    id
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| match document.get(key) {
            Some(actual) => values_equal(actual, expected),
            None => matches!(expected, Bson::Null),
        })
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(f) => Some(*f),
        _ => None,
    }
}

fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) => 0,
        Some(Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_)) => 1,
        Some(Bson::String(_)) => 2,
        Some(Bson::ObjectId(_)) => 3,
        Some(Bson::Boolean(_)) => 4,
        Some(Bson::DateTime(_)) => 5,
        Some(_) => 6,
    }
}

fn compare(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }
    match (a, b) {
        (Some(Bson::String(x)), Some(Bson::String(y))) => x.cmp(y),
        (Some(Bson::ObjectId(x)), Some(Bson::ObjectId(y))) => x.bytes().cmp(&y.bytes()),
        (Some(Bson::Boolean(x)), Some(Bson::Boolean(y))) => x.cmp(y),
        (Some(Bson::DateTime(x)), Some(Bson::DateTime(y))) => x.cmp(y),
        (Some(x), Some(y)) => match (as_f64(x), as_f64(y)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        _ => Ordering::Equal,
    }
}
