use hookstore_hooks::{
    CallbackRegistry, HookError, OperationContext, OperationPhase, Payload, PluginConfig,
    Validation,
};
use hookstore_model::{
    FieldError, Model, StructValidator, TagValidator, Validate, ValidationErrors,
};
use hookstore_types::timestamp;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default, Validate)]
struct Account {
    #[validate(range(min = 0))]
    balance: i64,
}

impl Account {
    fn with_balance(balance: i64) -> Self {
        Self { balance }
    }
}

struct Counting(Arc<AtomicUsize>);

impl StructValidator for Counting {
    fn validate(&self, model: &dyn Model) -> Result<(), ValidationErrors> {
        self.0.fetch_add(1, Ordering::SeqCst);
        TagValidator.validate(model)
    }
}

impl Model for Account {
    fn as_validate(&self) -> Option<&dyn Validate> {
        Some(self)
    }
}

fn assert_balance_error(err: HookError) {
    let errors = err.as_validation().expect("validation error");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.errors()[0].field, "balance");
    assert_eq!(errors.errors()[0].code, "range");
}

#[test]
fn insert_rejects_invalid_document() {
    let validation = Validation::default();
    let mut account = Account::with_balance(-1);
    let mut ctx = OperationContext::new("accounts").with_document(&mut account);

    let err = validation.execute(&mut ctx, OperationPhase::BeforeInsert).unwrap_err();
    assert_balance_error(err);
}

#[test]
fn upsert_validates_replacement() {
    let validation = Validation::default();
    let mut replacement = Account::with_balance(-1);
    let mut ctx = OperationContext::new("accounts").with_replacement(&mut replacement);

    let err = validation.execute(&mut ctx, OperationPhase::BeforeUpsert).unwrap_err();
    assert_balance_error(err);
}

#[test]
fn upsert_ignores_document_payload() {
    let validation = Validation::default();
    let mut account = Account::with_balance(-1);
    let mut ctx = OperationContext::new("accounts").with_document(&mut account);

    validation.execute(&mut ctx, OperationPhase::BeforeUpsert).unwrap();
}

#[test]
fn other_phases_never_validate() {
    let validation = Validation::default();
    let mut account = Account::with_balance(-1);
    let mut replacement = Account::with_balance(-1);
    let mut ctx = OperationContext::new("accounts")
        .with_document(&mut account)
        .with_replacement(&mut replacement);

    for phase in OperationPhase::ALL {
        if matches!(phase, OperationPhase::BeforeInsert | OperationPhase::BeforeUpsert) {
            continue;
        }
        validation.execute(&mut ctx, phase).unwrap();
    }
}

#[test]
fn first_invalid_element_stops_the_list() {
    let checks = Arc::new(AtomicUsize::new(0));
    let mut accounts: Vec<Account> = [10, -1, -2, 5]
        .into_iter()
        .map(Account::with_balance)
        .collect();

    let validation = Validation::new(Arc::new(Counting(Arc::clone(&checks))));
    let mut ctx = OperationContext::new("accounts").with_payload(Payload::many(&mut accounts));
    let err = validation.execute(&mut ctx, OperationPhase::BeforeInsert).unwrap_err();

    assert_balance_error(err);
    assert_eq!(checks.load(Ordering::SeqCst), 2);
}

#[test]
fn valid_list_passes() {
    let mut accounts = vec![Account::with_balance(0), Account::with_balance(7)];
    let validation = Validation::default();
    let mut ctx = OperationContext::new("accounts").with_payload(Payload::many(&mut accounts));

    validation.execute(&mut ctx, OperationPhase::BeforeInsert).unwrap();
}

#[test]
fn timestamps_are_not_validated() {
    struct Strict;

    impl StructValidator for Strict {
        fn validate(&self, _model: &dyn Model) -> Result<(), ValidationErrors> {
            let mut errors = ValidationErrors::new();
            errors.push(FieldError {
                field: "any".into(),
                code: "required".into(),
                value: serde_json::Value::Null,
            });
            Err(errors)
        }
    }

    let validation = Validation::new(Arc::new(Strict));
    let mut now = timestamp::now();
    let mut ctx = OperationContext::new("events").with_document(&mut now);

    validation.execute(&mut ctx, OperationPhase::BeforeInsert).unwrap();
}

#[test]
fn configured_validator_replaces_default() {
    struct DenyAll;

    impl StructValidator for DenyAll {
        fn validate(&self, _model: &dyn Model) -> Result<(), ValidationErrors> {
            let mut errors = ValidationErrors::new();
            errors.push(FieldError {
                field: "tenant".into(),
                code: "required".into(),
                value: serde_json::Value::Null,
            });
            Err(errors)
        }
    }

    let registry = CallbackRegistry::new();
    PluginConfig {
        enable_validation_hook: true,
        ..PluginConfig::default()
    }
    .with_validator(DenyAll)
    .install(&registry);

    let mut account = Account::with_balance(100);
    let mut ctx = OperationContext::new("accounts").with_document(&mut account);
    let err = registry
        .execute(&mut ctx, &[OperationPhase::BeforeInsert])
        .unwrap_err();

    assert_eq!(err.as_validation().unwrap().errors()[0].field, "tenant");
}
