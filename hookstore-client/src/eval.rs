//! Filter matching, update application and ordering over JSON documents.

use hookstore_types::{Document, ObjectId, SortOrder, UpdateExpr, UpdateOperator};
use serde_json::{Number, Value};
use std::cmp::Ordering;

use crate::{StoreError, StoreResult};

static NULL: Value = Value::Null;

/// Resolves a dotted path such as `address.city` or `tags.0`.
pub(crate) fn lookup<'d>(doc: &'d Document, path: &str) -> Option<&'d Value> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn lookup_mut<'d>(doc: &'d mut Document, path: &str) -> Option<&'d mut Value> {
    let mut parts = path.split('.');
    let mut current = doc.get_mut(parts.next()?)?;
    for part in parts {
        current = match current {
            Value::Object(map) => map.get_mut(part)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Writes `value` at `path`, creating intermediate objects.
fn set_path(doc: &mut Document, path: &str, value: Value) -> StoreResult<()> {
    let (parent, leaf) = match path.rsplit_once('.') {
        Some((parent, leaf)) => (Some(parent), leaf),
        None => (None, path),
    };

    let mut target = doc;
    for part in parent.into_iter().flat_map(|p| p.split('.')) {
        let entry = target
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Document::new()));
        let Value::Object(map) = entry else {
            return Err(StoreError::InvalidUpdate(format!(
                "cannot set '{path}': '{part}' is not an object"
            )));
        };
        target = map;
    }
    target.insert(leaf.to_string(), value);
    Ok(())
}

fn remove_path(doc: &mut Document, path: &str) {
    match path.rsplit_once('.') {
        None => {
            doc.remove(path);
        }
        Some((parent, leaf)) => {
            if let Some(Value::Object(map)) = lookup_mut(doc, parent) {
                map.remove(leaf);
            }
        }
    }
}

fn is_operator_object(map: &Document) -> bool {
    !map.is_empty() && map.keys().all(|k| k.starts_with('$'))
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Equality with array membership: `{"tags": "x"}` matches `tags: ["x", "y"]`.
fn equals(value: Option<&Value>, expected: &Value) -> bool {
    match value {
        Some(Value::Array(items)) if !expected.is_array() => {
            items.iter().any(|item| values_equal(item, expected))
        }
        Some(value) => values_equal(value, expected),
        None => expected.is_null(),
    }
}

fn compare_to(value: Option<&Value>, operand: &Value) -> Option<Ordering> {
    match (value?, operand) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn matches_operator(value: Option<&Value>, op: &str, operand: &Value) -> StoreResult<bool> {
    Ok(match op {
        "$eq" => equals(value, operand),
        "$ne" => !equals(value, operand),
        "$gt" => compare_to(value, operand).is_some_and(Ordering::is_gt),
        "$gte" => compare_to(value, operand).is_some_and(Ordering::is_ge),
        "$lt" => compare_to(value, operand).is_some_and(Ordering::is_lt),
        "$lte" => compare_to(value, operand).is_some_and(Ordering::is_le),
        "$in" => {
            let Value::Array(candidates) = operand else {
                return Err(StoreError::InvalidFilter("$in needs an array".into()));
            };
            candidates.iter().any(|candidate| equals(value, candidate))
        }
        "$exists" => value.is_some() == operand.as_bool().unwrap_or(true),
        other => {
            return Err(StoreError::InvalidFilter(format!("unsupported operator {other}")));
        }
    })
}

/// Returns `true` when `doc` satisfies every condition of `filter`.
pub(crate) fn matches(doc: &Document, filter: &Document) -> StoreResult<bool> {
    for (field, condition) in filter {
        if field.starts_with('$') {
            return Err(StoreError::InvalidFilter(format!(
                "unsupported top-level operator {field}"
            )));
        }
        let value = lookup(doc, field);
        let satisfied = match condition {
            Value::Object(ops) if is_operator_object(ops) => {
                let mut all = true;
                for (op, operand) in ops {
                    if !matches_operator(value, op, operand)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            literal => equals(value, literal),
        };
        if !satisfied {
            return Ok(false);
        }
    }
    Ok(true)
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}

/// Total order across JSON types: null < numbers < strings < objects <
/// arrays < booleans. Missing fields sort as null.
pub(crate) fn total_cmp(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let (a, b) = (a.unwrap_or(&NULL), b.unwrap_or(&NULL));
    rank(a).cmp(&rank(b)).then_with(|| match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .unwrap_or_default()
            .total_cmp(&y.as_f64().unwrap_or_default()),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    })
}

pub(crate) fn compare_documents(a: &Document, b: &Document, sort: &[(String, SortOrder)]) -> Ordering {
    for (field, order) in sort {
        let ordering = total_cmp(lookup(a, field), lookup(b, field));
        let ordering = match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        };
        if ordering.is_ne() {
            return ordering;
        }
    }
    Ordering::Equal
}

fn increment(current: Option<&Value>, by: &Value, path: &str) -> StoreResult<Value> {
    let Value::Number(by_n) = by else {
        return Err(StoreError::InvalidUpdate(format!("$inc on '{path}' needs a number")));
    };
    match current {
        None | Some(Value::Null) => Ok(by.clone()),
        Some(Value::Number(n)) => {
            if let (Some(a), Some(b)) = (n.as_i64(), by_n.as_i64())
                && let Some(sum) = a.checked_add(b)
            {
                return Ok(Value::from(sum));
            }
            let sum = n.as_f64().unwrap_or_default() + by_n.as_f64().unwrap_or_default();
            Ok(Number::from_f64(sum).map_or(Value::Null, Value::Number))
        }
        Some(_) => Err(StoreError::InvalidUpdate(format!("$inc target '{path}' is not numeric"))),
    }
}

fn apply_operator(
    doc: &mut Document,
    op: UpdateOperator,
    fields: &Document,
    inserting: bool,
) -> StoreResult<()> {
    for (path, value) in fields {
        match op {
            UpdateOperator::Set => set_path(doc, path, value.clone())?,
            UpdateOperator::SetOnInsert => {
                if inserting {
                    set_path(doc, path, value.clone())?;
                }
            }
            UpdateOperator::Unset => remove_path(doc, path),
            UpdateOperator::Inc => {
                let next = increment(lookup(doc, path), value, path)?;
                set_path(doc, path, next)?;
            }
            UpdateOperator::Push => match lookup_mut(doc, path) {
                Some(Value::Array(items)) => items.push(value.clone()),
                Some(_) => {
                    return Err(StoreError::InvalidUpdate(format!(
                        "$push target '{path}' is not an array"
                    )));
                }
                None => set_path(doc, path, Value::Array(vec![value.clone()]))?,
            },
        }
    }
    Ok(())
}

fn apply_stage(doc: &mut Document, stage: &Document) -> StoreResult<()> {
    for (name, arg) in stage {
        match (name.as_str(), arg) {
            ("$set" | "$addFields", Value::Object(fields)) => {
                for (path, value) in fields {
                    set_path(doc, path, value.clone())?;
                }
            }
            ("$unset", Value::String(path)) => remove_path(doc, path),
            ("$unset", Value::Array(paths)) => {
                for path in paths.iter().filter_map(Value::as_str) {
                    remove_path(doc, path);
                }
            }
            (other, _) => {
                return Err(StoreError::InvalidUpdate(format!(
                    "unsupported pipeline update stage {other}"
                )));
            }
        }
    }
    Ok(())
}

/// Applies `update` to `doc`. `$setOnInsert` fields are written only when
/// `inserting`.
pub(crate) fn apply_update(doc: &mut Document, update: &UpdateExpr, inserting: bool) -> StoreResult<()> {
    match update {
        UpdateExpr::Operators(update) => {
            for (op, fields) in update.sections() {
                apply_operator(doc, op, fields, inserting)?;
            }
        }
        UpdateExpr::Pipeline(stages) => {
            for stage in stages {
                apply_stage(doc, stage)?;
            }
        }
    }
    Ok(())
}

/// The document an upsert starts from: the filter's equality conditions.
pub(crate) fn seed_from_filter(filter: &Document) -> StoreResult<Document> {
    let mut doc = Document::new();
    for (field, condition) in filter {
        match condition {
            Value::Object(ops) if is_operator_object(ops) => {
                if let Some(value) = ops.get("$eq") {
                    set_path(&mut doc, field, value.clone())?;
                }
            }
            literal => set_path(&mut doc, field, literal.clone())?,
        }
    }
    Ok(doc)
}

/// Builds the document an upsert inserts. An `_id` pinned by the filter's
/// equality conditions wins over one written by `$setOnInsert`.
pub(crate) fn upsert_document(filter: &Document, update: &UpdateExpr) -> StoreResult<Document> {
    let mut doc = seed_from_filter(filter)?;
    let pinned = doc.get("_id").cloned();
    apply_update(&mut doc, update, true)?;
    if let Some(id) = pinned {
        doc.insert("_id".to_string(), id);
    }
    Ok(doc)
}

/// Returns the document's `_id`, generating one if absent.
pub(crate) fn ensure_id(doc: &mut Document) -> Value {
    doc.entry("_id")
        .or_insert_with(|| ObjectId::new().into())
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookstore_types::Update;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn dotted_paths_resolve() {
        let d = doc(json!({"a": {"b": [10, 20]}}));
        assert_eq!(lookup(&d, "a.b.1"), Some(&json!(20)));
        assert_eq!(lookup(&d, "a.c"), None);
    }

    #[test]
    fn range_operators_compare_numbers() {
        let d = doc(json!({"age": 30}));
        assert!(matches(&d, &doc(json!({"age": {"$gte": 18, "$lt": 65}}))).unwrap());
        assert!(!matches(&d, &doc(json!({"age": {"$gt": 30}}))).unwrap());
        assert!(!matches(&d, &doc(json!({"age": {"$gt": "a"}}))).unwrap());
    }

    #[test]
    fn missing_field_equals_null() {
        let d = doc(json!({"a": 1}));
        assert!(matches(&d, &doc(json!({"b": null}))).unwrap());
        assert!(matches(&d, &doc(json!({"b": {"$exists": false}}))).unwrap());
    }

    #[test]
    fn unknown_operator_is_an_error() {
        let d = doc(json!({"a": 1}));
        assert!(matches(&d, &doc(json!({"a": {"$regex": "x"}}))).is_err());
    }

    #[test]
    fn inc_keeps_integers() {
        let mut d = doc(json!({"n": 1}));
        apply_update(&mut d, &Update::new().inc("n", 2).into(), false).unwrap();
        assert_eq!(d.get("n"), Some(&json!(3)));
    }

    #[test]
    fn set_on_insert_only_when_inserting() {
        let update: UpdateExpr = Update::new().set_on_insert("created", 1).into();
        let mut d = Document::new();
        apply_update(&mut d, &update, false).unwrap();
        assert!(d.is_empty());
        apply_update(&mut d, &update, true).unwrap();
        assert_eq!(d.get("created"), Some(&json!(1)));
    }

    #[test]
    fn filter_id_survives_set_on_insert() {
        let filter = doc(json!({"_id": "pinned", "name": "ada"}));
        let update = UpdateExpr::from(Update::new().set_on_insert("_id", "fresh").set("age", 3));
        let inserted = upsert_document(&filter, &update).unwrap();
        assert_eq!(
            Value::Object(inserted),
            json!({"_id": "pinned", "name": "ada", "age": 3})
        );
    }

    #[test]
    fn set_on_insert_id_used_without_filter_id() {
        let filter = doc(json!({"name": "ada"}));
        let update = UpdateExpr::from(Update::new().set_on_insert("_id", "fresh"));
        let inserted = upsert_document(&filter, &update).unwrap();
        assert_eq!(inserted.get("_id"), Some(&json!("fresh")));
    }

    #[test]
    fn nested_set_creates_objects() {
        let mut d = Document::new();
        apply_update(&mut d, &Update::new().set("a.b", 1).into(), false).unwrap();
        assert_eq!(Value::Object(d), json!({"a": {"b": 1}}));
    }

    #[test]
    fn types_sort_by_rank() {
        assert!(total_cmp(None, Some(&json!(0))).is_lt());
        assert!(total_cmp(Some(&json!(9)), Some(&json!("a"))).is_lt());
        assert!(total_cmp(Some(&json!(2.5)), Some(&json!(2))).is_gt());
    }
}
