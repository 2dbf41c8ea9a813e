//! Remote document store contract.
//!
//! The wrappers treat a store as an opaque async call per verb. Filters and
//! update expressions arrive after the hook pipeline has finished with
//! them.

use async_trait::async_trait;
use hookstore_types::{
    AggregateOptions, CountOptions, DeleteOptions, DeleteResult, Document, Filter,
    FindOneAndUpdateOptions, FindOptions, InsertManyOptions, InsertManyResult, InsertOneOptions,
    InsertOneResult, UpdateExpr, UpdateOptions, UpdateResult,
};
use serde_json::Value;

use crate::StoreResult;

/// A document store reachable by collection name.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts one document. The store assigns `_id` when it is missing.
    async fn insert_one(
        &self,
        collection: &str,
        doc: Document,
        options: &InsertOneOptions,
    ) -> StoreResult<InsertOneResult>;

    /// Inserts a batch. When a document fails after others were written,
    /// the error is [`StoreError::PartialInsert`](crate::StoreError::PartialInsert)
    /// carrying the committed ids. An ordered batch stops at the failure.
    async fn insert_many(
        &self,
        collection: &str,
        docs: Vec<Document>,
        options: &InsertManyOptions,
    ) -> StoreResult<InsertManyResult>;

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Option<Document>>;

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>>;

    async fn count(
        &self,
        collection: &str,
        filter: &Filter,
        options: &CountOptions,
    ) -> StoreResult<u64>;

    /// Distinct values of `field` across matching documents.
    async fn distinct(&self, collection: &str, field: &str, filter: &Filter)
    -> StoreResult<Vec<Value>>;

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &UpdateExpr,
        options: &UpdateOptions,
    ) -> StoreResult<UpdateResult>;

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        update: &UpdateExpr,
        options: &UpdateOptions,
    ) -> StoreResult<UpdateResult>;

    /// Replaces the first matching document, keeping its `_id`.
    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        replacement: Document,
        options: &UpdateOptions,
    ) -> StoreResult<UpdateResult>;

    /// Updates the first matching document and returns it as selected by
    /// [`ReturnDocument`](hookstore_types::ReturnDocument).
    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &UpdateExpr,
        options: &FindOneAndUpdateOptions,
    ) -> StoreResult<Option<Document>>;

    async fn delete_one(
        &self,
        collection: &str,
        filter: &Filter,
        options: &DeleteOptions,
    ) -> StoreResult<DeleteResult>;

    async fn delete_many(
        &self,
        collection: &str,
        filter: &Filter,
        options: &DeleteOptions,
    ) -> StoreResult<DeleteResult>;

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &[Document],
        options: &AggregateOptions,
    ) -> StoreResult<Vec<Document>>;
}
