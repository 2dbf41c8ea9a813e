//! Glue between the wrappers, the callback registry and the store.

use hookstore_hooks::{CallbackRegistry, HookError, OperationContext, OperationPhase};
use hookstore_types::Document;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{ClientError, ClientResult};

/// Runs the before phases. A failure aborts the call untouched.
pub(crate) fn before(
    registry: &CallbackRegistry,
    ctx: &mut OperationContext<'_>,
    phases: &[OperationPhase],
) -> ClientResult<()> {
    registry.execute(ctx, phases).map_err(ClientError::Hook)
}

/// Runs the after phases one at a time so a failure can name its phase.
pub(crate) fn after(
    registry: &CallbackRegistry,
    ctx: &mut OperationContext<'_>,
    phases: &[OperationPhase],
) -> ClientResult<()> {
    for &phase in phases {
        registry
            .execute(ctx, &[phase])
            .map_err(|err| ClientError::after_commit(phase, err))?;
    }
    Ok(())
}

/// Maps a local after-chain failure onto the last after phase of the call.
pub(crate) fn local_after(result: Result<(), HookError>, phases: &[OperationPhase]) -> ClientResult<()> {
    match (result, phases.last()) {
        (Ok(()), _) => Ok(()),
        (Err(err), Some(&phase)) => Err(ClientError::after_commit(phase, err)),
        (Err(err), None) => Err(ClientError::Hook(err)),
    }
}

pub(crate) fn to_document<T: Serialize + ?Sized>(value: &T) -> ClientResult<Document> {
    match serde_json::to_value(value)? {
        Value::Object(doc) => Ok(doc),
        other => Err(ClientError::Serialization(serde::ser::Error::custom(format!(
            "expected a document, got {other}"
        )))),
    }
}

pub(crate) fn from_document<T: DeserializeOwned>(doc: Document) -> ClientResult<T> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

pub(crate) fn from_documents<T: DeserializeOwned>(docs: Vec<Document>) -> ClientResult<Vec<T>> {
    docs.into_iter().map(from_document).collect()
}
