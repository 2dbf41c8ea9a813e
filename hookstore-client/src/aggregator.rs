//! Aggregation wrapper. Pipelines bypass the hook phases.

use hookstore_types::{AggregateOptions, Document};
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;

use crate::collection::Target;
use crate::{ClientResult, DocumentStore, pipeline};

/// Runs aggregation pipelines over one collection.
pub struct Aggregator<T, S: ?Sized> {
    target: Target<S>,
    pipeline: Vec<Document>,
    options: AggregateOptions,
    _model: PhantomData<fn() -> T>,
}

impl<T, S: DocumentStore + ?Sized> Aggregator<T, S> {
    pub(crate) fn new(target: Target<S>) -> Self {
        Self {
            target,
            pipeline: Vec::new(),
            options: AggregateOptions::default(),
            _model: PhantomData,
        }
    }

    #[must_use]
    pub fn pipeline(mut self, stages: Vec<Document>) -> Self {
        self.pipeline = stages;
        self
    }

    /// Appends one stage.
    #[must_use]
    pub fn stage(mut self, stage: Document) -> Self {
        self.pipeline.push(stage);
        self
    }

    #[must_use]
    pub fn options(mut self, options: AggregateOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs the pipeline and decodes each output document as `T`.
    pub async fn aggregate(self) -> ClientResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        self.aggregate_as().await
    }

    /// Runs the pipeline and decodes each output document as `R`, for
    /// stages that reshape documents.
    pub async fn aggregate_as<R: DeserializeOwned>(self) -> ClientResult<Vec<R>> {
        let name = self.target.name();
        debug!(collection = name, stages = self.pipeline.len(), "aggregate");
        let docs = self
            .target
            .store()
            .aggregate(name, &self.pipeline, &self.options)
            .await?;
        pipeline::from_documents(docs)
    }
}

impl<T, S: ?Sized> fmt::Debug for Aggregator<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregator")
            .field("collection", &self.target.name())
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}
