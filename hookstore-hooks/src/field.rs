//! Field-default strategy.
//!
//! Before an insert, every payload element that implements one of the
//! field-default contracts gets its id and creation time initialised in
//! place. Before an update the modification time is written into `$set`;
//! before an upsert, `$set` receives the modification time and
//! `$setOnInsert` the id and creation time.
//!
//! Elements that implement neither contract, missing payloads and
//! pipeline-shaped update expressions are skipped.

use hookstore_model::{
    CREATED_AT_FIELD, CustomFields, DefaultFields, ID_FIELD, Model, NamedValue, UPDATED_AT_FIELD,
};
use hookstore_types::{UpdateExpr, UpdateOperator};

use crate::{HookResult, OperationContext, OperationPhase};

/// The contract an element resolved to. Fixed names win when both are
/// implemented.
enum Defaults<'m> {
    Fixed(&'m mut dyn DefaultFields),
    Custom(&'m mut dyn CustomFields),
}

impl Defaults<'_> {
    fn resolve(doc: &mut dyn Model) -> Option<Defaults<'_>> {
        if doc.as_default_fields().is_some() {
            return doc.as_default_fields().map(Defaults::Fixed);
        }
        doc.as_custom_fields().map(Defaults::Custom)
    }

    fn initialise(&mut self) {
        match self {
            Defaults::Fixed(fields) => {
                fields.default_id();
                fields.default_created_at();
            }
            Defaults::Custom(fields) => {
                fields.custom_id();
                fields.custom_created_at();
            }
        }
    }

    fn id(&mut self) -> HookResult<NamedValue> {
        Ok(match self {
            Defaults::Fixed(fields) => (ID_FIELD.to_string(), serde_json::to_value(fields.default_id())?),
            Defaults::Custom(fields) => fields.custom_id(),
        })
    }

    fn created_at(&mut self) -> HookResult<NamedValue> {
        Ok(match self {
            Defaults::Fixed(fields) => (
                CREATED_AT_FIELD.to_string(),
                serde_json::to_value(fields.default_created_at())?,
            ),
            Defaults::Custom(fields) => fields.custom_created_at(),
        })
    }

    fn updated_at(&mut self) -> HookResult<NamedValue> {
        Ok(match self {
            Defaults::Fixed(fields) => (
                UPDATED_AT_FIELD.to_string(),
                serde_json::to_value(fields.default_updated_at())?,
            ),
            Defaults::Custom(fields) => fields.custom_updated_at(),
        })
    }
}

/// Registry entry point for the field-default strategy.
pub fn execute(ctx: &mut OperationContext<'_>, phase: OperationPhase) -> HookResult {
    let updates = &mut ctx.updates;
    let Some(payload) = ctx.document.as_mut() else {
        return Ok(());
    };
    payload.try_for_each(|doc| apply(doc, phase, updates.as_deref_mut()))
}

fn apply(doc: &mut dyn Model, phase: OperationPhase, updates: Option<&mut UpdateExpr>) -> HookResult {
    let Some(mut defaults) = Defaults::resolve(doc) else {
        return Ok(());
    };

    match phase {
        OperationPhase::BeforeInsert => defaults.initialise(),
        OperationPhase::BeforeUpdate => {
            let Some(update) = updates.and_then(UpdateExpr::as_operators_mut) else {
                return Ok(());
            };
            let (name, value) = defaults.updated_at()?;
            update.put(UpdateOperator::Set, &name, value);
        }
        OperationPhase::BeforeUpsert => {
            let Some(update) = updates.and_then(UpdateExpr::as_operators_mut) else {
                return Ok(());
            };
            let (name, value) = defaults.updated_at()?;
            update.put(UpdateOperator::Set, &name, value);

            let (name, value) = defaults.id()?;
            update.put(UpdateOperator::SetOnInsert, &name, value);
            let (name, value) = defaults.created_at()?;
            update.put(UpdateOperator::SetOnInsert, &name, value);
        }
        _ => {}
    }
    Ok(())
}
