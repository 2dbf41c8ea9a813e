use hookstore_model::{FieldError, Model, StructValidator, TagValidator, Validate, ValidationErrors};
use pretty_assertions::assert_eq;
use serde_json::json;
use validator::ValidationError;

#[derive(Validate)]
struct User {
    #[validate(length(min = 1, max = 8))]
    name: String,
    #[validate(range(min = 0, max = 150))]
    age: i64,
    #[validate(custom(function = "known_role"))]
    role: String,
    #[validate(length(max = 2))]
    tags: Vec<String>,
}

fn known_role(role: &str) -> Result<(), ValidationError> {
    match role {
        "admin" | "member" => Ok(()),
        _ => Err(ValidationError::new("one_of")),
    }
}

impl Model for User {
    fn as_validate(&self) -> Option<&dyn Validate> {
        Some(self)
    }
}

struct Unchecked;

impl Model for Unchecked {}

fn valid_user() -> User {
    User {
        name: "ada".into(),
        age: 36,
        role: "admin".into(),
        tags: vec!["x".into()],
    }
}

#[test]
fn valid_model_passes() {
    assert_eq!(TagValidator.validate(&valid_user()), Ok(()));
}

#[test]
fn negative_age_is_reported() {
    let user = User {
        age: -1,
        ..valid_user()
    };
    let errors = TagValidator.validate(&user).unwrap_err();
    assert_eq!(
        errors.errors(),
        &[FieldError {
            field: "age".into(),
            code: "range".into(),
            value: json!(-1),
        }]
    );
}

#[test]
fn every_violation_is_collected() {
    let user = User {
        name: String::new(),
        age: 200,
        role: "guest".into(),
        tags: vec!["a".into(), "b".into(), "c".into()],
    };
    let errors = TagValidator.validate(&user).unwrap_err();
    assert_eq!(errors.len(), 4);
    assert_eq!(errors.field("name").count(), 1);
    assert_eq!(
        errors.field("tags").next().map(|e| e.code.as_str()),
        Some("length")
    );
    assert_eq!(
        errors.field("role").next().map(|e| &e.value),
        Some(&serde_json::Value::Null)
    );
}

#[test]
fn models_without_constraints_are_valid() {
    assert_eq!(TagValidator.validate(&Unchecked), Ok(()));
}

#[test]
fn display_lists_fields() {
    let user = User {
        age: -1,
        role: "guest".into(),
        ..valid_user()
    };
    let message = TagValidator.validate(&user).unwrap_err().to_string();
    assert_eq!(
        message,
        "validation failed: field 'age' failed 'range' (got -1); field 'role' failed 'one_of' (got null)"
    );
}

#[test]
fn manual_errors_render_like_derived_ones() {
    let mut errors = ValidationErrors::new();
    errors.push(FieldError {
        field: "email".into(),
        code: "email".into(),
        value: json!("nope"),
    });
    assert_eq!(
        errors.to_string(),
        "validation failed: field 'email' failed 'email' (got \"nope\")"
    );
}
