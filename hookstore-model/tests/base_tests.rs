use hookstore_model::{Base, DefaultFields, Model};
use hookstore_types::ObjectId;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn default_id_generates_once() {
    let mut base = Base::default();
    let first = base.default_id();
    assert!(!first.is_nil());
    assert_eq!(base.default_id(), first);
}

#[test]
fn default_id_keeps_caller_id() {
    let id = ObjectId::new();
    let mut base = Base {
        id,
        ..Base::default()
    };
    assert_eq!(base.default_id(), id);
}

#[test]
fn created_at_is_lazy_and_updated_at_regenerates() {
    let mut base = Base::default();
    let created = base.default_created_at();
    let updated = base.default_updated_at();

    std::thread::sleep(std::time::Duration::from_millis(2));

    assert_eq!(base.default_created_at(), created);
    assert!(base.default_updated_at() > updated);
}

#[test]
fn base_exposes_fixed_name_contract_only() {
    let mut base = Base::default();
    assert!(base.as_default_fields().is_some());
    assert!(base.as_custom_fields().is_none());
    assert!(base.as_validate().is_none());
    assert!(base.as_timestamp().is_none());
}

#[test]
fn unset_fields_are_not_serialized() {
    let value = serde_json::to_value(Base::default()).unwrap();
    assert_eq!(value, json!({}));
}

#[test]
fn id_serializes_under_underscore_id() {
    let mut base = Base::default();
    let id = base.default_id();
    let value = serde_json::to_value(&base).unwrap();
    assert_eq!(value["_id"], json!(id.to_string()));

    let back: Base = serde_json::from_value(value).unwrap();
    assert_eq!(back.id, id);
}
