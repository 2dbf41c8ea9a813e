use hookstore_types::{Error, ObjectId};
use std::collections::HashSet;
use std::str::FromStr;

#[test]
fn new_ids_are_unique() {
    let ids: HashSet<ObjectId> = (0..1000).map(|_| ObjectId::new()).collect();
    assert_eq!(ids.len(), 1000);
}

#[test]
fn default_is_nil() {
    let id = ObjectId::default();
    assert!(id.is_nil());
    assert_eq!(id, ObjectId::nil());
    assert!(!ObjectId::new().is_nil());
}

#[test]
fn display_and_parse() {
    let id = ObjectId::new();
    let parsed = ObjectId::parse(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
    assert_eq!(ObjectId::from_str(&id.to_string()).unwrap(), id);
}

#[test]
fn parse_invalid_reports_the_input() {
    let err = ObjectId::parse("not-an-id").unwrap_err();
    assert!(matches!(
        &err,
        Error::InvalidObjectId { input, .. } if input == "not-an-id"
    ));
    assert!(err.to_string().starts_with("invalid object id 'not-an-id': "));
    assert!("nope".parse::<ObjectId>().is_err());
}

#[test]
fn ids_are_time_ordered() {
    let a = ObjectId::new();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let b = ObjectId::new();
    assert!(a < b);
}

#[test]
fn serializes_as_plain_string() {
    let id = ObjectId::new();
    let json = serde_json::to_value(id).unwrap();
    assert_eq!(json, serde_json::Value::String(id.to_string()));
    assert_eq!(serde_json::Value::from(id), json);
}
