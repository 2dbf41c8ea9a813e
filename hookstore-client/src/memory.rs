//! In-process document store.
//!
//! Keeps every collection as a `Vec<Document>` in insertion order behind a
//! `tokio::sync::RwLock`. Writes are applied to a copy of the matched
//! document and only committed when the whole update succeeds.

use async_trait::async_trait;
use hookstore_types::{
    AggregateOptions, CountOptions, DeleteOptions, DeleteResult, Document, Filter,
    FindOneAndUpdateOptions, FindOptions, InsertManyOptions, InsertManyResult, InsertOneOptions,
    InsertOneResult, ReturnDocument, SortOrder, UpdateExpr, UpdateOptions, UpdateResult,
};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::trace;

use crate::eval::{
    apply_update, compare_documents, ensure_id, lookup, matches, seed_from_filter, upsert_document,
};
use crate::{DocumentStore, StoreError, StoreResult};

/// A [`DocumentStore`] held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a collection in insertion order.
    pub async fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of documents stored in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }

    pub async fn is_empty(&self, collection: &str) -> bool {
        self.len(collection).await == 0
    }
}

fn check_unique(docs: &[Document], id: &Value) -> StoreResult<()> {
    if docs.iter().any(|doc| doc.get("_id") == Some(id)) {
        return Err(StoreError::DuplicateKey(id.to_string()));
    }
    Ok(())
}

fn matching<'d>(docs: &'d [Document], filter: &Filter) -> StoreResult<Vec<&'d Document>> {
    let mut found = Vec::new();
    for doc in docs {
        if matches(doc, filter.as_document())? {
            found.push(doc);
        }
    }
    Ok(found)
}

fn position(docs: &[Document], filter: &Filter) -> StoreResult<Option<usize>> {
    for (i, doc) in docs.iter().enumerate() {
        if matches(doc, filter.as_document())? {
            return Ok(Some(i));
        }
    }
    Ok(None)
}

/// Applies skip and limit; a zero limit means no limit.
fn window<T>(items: Vec<T>, skip: Option<usize>, limit: Option<usize>) -> Vec<T> {
    let limit = limit.filter(|&n| n > 0).unwrap_or(usize::MAX);
    items.into_iter().skip(skip.unwrap_or(0)).take(limit).collect()
}

fn update_docs(
    docs: &mut Vec<Document>,
    filter: &Filter,
    update: &UpdateExpr,
    options: &UpdateOptions,
    many: bool,
) -> StoreResult<UpdateResult> {
    let mut result = UpdateResult::default();
    for doc in docs.iter_mut() {
        if !matches(doc, filter.as_document())? {
            continue;
        }
        result.matched_count += 1;

        let mut next = doc.clone();
        apply_update(&mut next, update, false)?;
        if next != *doc {
            *doc = next;
            result.modified_count += 1;
        }
        if !many {
            break;
        }
    }

    if result.matched_count == 0 && options.upsert {
        let mut doc = upsert_document(filter.as_document(), update)?;
        let id = ensure_id(&mut doc);
        check_unique(docs, &id)?;
        docs.push(doc);
        result.upserted_id = Some(id);
    }
    Ok(result)
}

fn sort_keys(arg: &Value) -> StoreResult<Vec<(String, SortOrder)>> {
    let Value::Object(fields) = arg else {
        return Err(StoreError::UnsupportedStage("$sort needs an object".into()));
    };
    Ok(fields
        .iter()
        .map(|(field, dir)| {
            let order = if dir.as_i64().is_some_and(|d| d < 0) {
                SortOrder::Desc
            } else {
                SortOrder::Asc
            };
            (field.clone(), order)
        })
        .collect())
}

fn stage_count(name: &str, arg: &Value) -> StoreResult<usize> {
    arg.as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| StoreError::UnsupportedStage(format!("{name} needs a non-negative integer")))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(
        &self,
        collection: &str,
        mut doc: Document,
        _options: &InsertOneOptions,
    ) -> StoreResult<InsertOneResult> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        let id = ensure_id(&mut doc);
        check_unique(docs, &id)?;
        docs.push(doc);
        trace!(collection, id = %id, "inserted document");
        Ok(InsertOneResult { inserted_id: id })
    }

    async fn insert_many(
        &self,
        collection: &str,
        batch: Vec<Document>,
        options: &InsertManyOptions,
    ) -> StoreResult<InsertManyResult> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        let mut inserted_ids = Vec::with_capacity(batch.len());
        let mut first_error = None;
        for mut doc in batch {
            let id = ensure_id(&mut doc);
            match check_unique(docs, &id) {
                Ok(()) => {
                    docs.push(doc);
                    inserted_ids.push(id);
                }
                Err(err) if options.ordered => return Err(StoreError::partial(inserted_ids, err)),
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        trace!(collection, count = inserted_ids.len(), "inserted documents");
        match first_error {
            Some(err) => Err(StoreError::partial(inserted_ids, err)),
            None => Ok(InsertManyResult { inserted_ids }),
        }
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Option<Document>> {
        let options = options.clone().limit(1);
        Ok(self.find(collection, filter, &options).await?.into_iter().next())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut found = matching(docs, filter)?;
        if !options.sort.is_empty() {
            found.sort_by(|a, b| compare_documents(a, b, &options.sort));
        }
        Ok(window(found, options.skip, options.limit)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn count(
        &self,
        collection: &str,
        filter: &Filter,
        options: &CountOptions,
    ) -> StoreResult<u64> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(0);
        };
        let found = window(matching(docs, filter)?, options.skip, options.limit);
        Ok(found.len() as u64)
    }

    async fn distinct(
        &self,
        collection: &str,
        field: &str,
        filter: &Filter,
    ) -> StoreResult<Vec<Value>> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut values: Vec<Value> = Vec::new();
        for doc in matching(docs, filter)? {
            let candidates = match lookup(doc, field) {
                Some(Value::Array(items)) => items.clone(),
                Some(value) => vec![value.clone()],
                None => continue,
            };
            for candidate in candidates {
                if !values.contains(&candidate) {
                    values.push(candidate);
                }
            }
        }
        Ok(values)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &UpdateExpr,
        options: &UpdateOptions,
    ) -> StoreResult<UpdateResult> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        update_docs(docs, filter, update, options, false)
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        update: &UpdateExpr,
        options: &UpdateOptions,
    ) -> StoreResult<UpdateResult> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        update_docs(docs, filter, update, options, true)
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        mut replacement: Document,
        options: &UpdateOptions,
    ) -> StoreResult<UpdateResult> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        if let Some(pos) = position(docs, filter)? {
            let current = &mut docs[pos];
            if let Some(id) = current.get("_id").cloned() {
                match replacement.get("_id") {
                    Some(new_id) if *new_id != id => {
                        return Err(StoreError::InvalidUpdate("replacement may not change _id".into()));
                    }
                    _ => {
                        replacement.insert("_id".to_string(), id);
                    }
                }
            }
            let modified = *current != replacement;
            *current = replacement;
            return Ok(UpdateResult {
                matched_count: 1,
                modified_count: u64::from(modified),
                upserted_id: None,
            });
        }

        if !options.upsert {
            return Ok(UpdateResult::default());
        }
        if !replacement.contains_key("_id")
            && let Some(id) = seed_from_filter(filter.as_document())?.get("_id")
        {
            replacement.insert("_id".to_string(), id.clone());
        }
        let id = ensure_id(&mut replacement);
        check_unique(docs, &id)?;
        docs.push(replacement);
        Ok(UpdateResult {
            matched_count: 0,
            modified_count: 0,
            upserted_id: Some(id),
        })
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &UpdateExpr,
        options: &FindOneAndUpdateOptions,
    ) -> StoreResult<Option<Document>> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        if let Some(pos) = position(docs, filter)? {
            let mut next = docs[pos].clone();
            apply_update(&mut next, update, false)?;
            let before = std::mem::replace(&mut docs[pos], next);
            return Ok(Some(match options.return_document {
                ReturnDocument::Before => before,
                ReturnDocument::After => docs[pos].clone(),
            }));
        }

        if !options.upsert {
            return Ok(None);
        }
        let mut doc = upsert_document(filter.as_document(), update)?;
        let id = ensure_id(&mut doc);
        check_unique(docs, &id)?;
        docs.push(doc.clone());
        Ok(match options.return_document {
            ReturnDocument::Before => None,
            ReturnDocument::After => Some(doc),
        })
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: &Filter,
        _options: &DeleteOptions,
    ) -> StoreResult<DeleteResult> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(DeleteResult::default());
        };
        match position(docs, filter)? {
            Some(pos) => {
                docs.remove(pos);
                Ok(DeleteResult { deleted_count: 1 })
            }
            None => Ok(DeleteResult::default()),
        }
    }

    async fn delete_many(
        &self,
        collection: &str,
        filter: &Filter,
        _options: &DeleteOptions,
    ) -> StoreResult<DeleteResult> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(DeleteResult::default());
        };

        let mut doomed = Vec::with_capacity(docs.len());
        for doc in docs.iter() {
            doomed.push(matches(doc, filter.as_document())?);
        }
        let before = docs.len();
        let mut doomed = doomed.into_iter();
        docs.retain(|_| !doomed.next().unwrap_or(false));
        Ok(DeleteResult {
            deleted_count: (before - docs.len()) as u64,
        })
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &[Document],
        _options: &AggregateOptions,
    ) -> StoreResult<Vec<Document>> {
        let mut docs = self.documents(collection).await;

        for stage in pipeline {
            for (name, arg) in stage {
                match name.as_str() {
                    "$match" => {
                        let Value::Object(filter) = arg else {
                            return Err(StoreError::UnsupportedStage("$match needs an object".into()));
                        };
                        let mut kept = Vec::with_capacity(docs.len());
                        for doc in docs {
                            if matches(&doc, filter)? {
                                kept.push(doc);
                            }
                        }
                        docs = kept;
                    }
                    "$sort" => {
                        let sort = sort_keys(arg)?;
                        docs.sort_by(|a, b| compare_documents(a, b, &sort));
                    }
                    "$skip" => {
                        let n = stage_count(name, arg)?;
                        docs = docs.into_iter().skip(n).collect();
                    }
                    "$limit" => {
                        let n = stage_count(name, arg)?;
                        docs.truncate(n);
                    }
                    other => return Err(StoreError::UnsupportedStage(other.to_string())),
                }
            }
        }
        Ok(docs)
    }
}
