mod common;

use common::{User, seed, users, users_with_plugins};
use hookstore_client::ClientError;
use hookstore_hooks::OperationPhase;
use hookstore_hooks::testing::{CallLog, rejecting};
use hookstore_types::{Filter, ObjectId, Update};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

fn people() -> Vec<User> {
    vec![User::new("ada", 36), User::new("alan", 41), User::new("grace", 85)]
}

async fn stored(store: &hookstore_client::MemoryStore, name: &str) -> serde_json::Map<String, Value> {
    store
        .documents("users")
        .await
        .into_iter()
        .find(|doc| doc.get("name") == Some(&json!(name)))
        .expect("stored document")
}

// ── update_one / update_many ────────────────────────────────────

#[tokio::test]
async fn update_one_stamps_updated_at() {
    let (store, _registry, users) = users_with_plugins();
    seed(&store, "users", &people()).await;

    let result = users
        .updater()
        .filter(Filter::new().eq("name", "ada"))
        .updates(Update::new().set("age", 37))
        .update_one()
        .await
        .unwrap();

    assert_eq!((result.matched_count, result.modified_count), (1, 1));
    let ada = stored(&store, "ada").await;
    assert_eq!(ada.get("age"), Some(&json!(37)));
    assert!(ada.contains_key("updated_at"));
    assert!(!ada.contains_key("created_at"));
}

#[tokio::test]
async fn update_many_touches_every_match() {
    let (store, _registry, users) = users();
    seed(&store, "users", &people()).await;

    let result = users
        .updater()
        .filter(Filter::new().gt("age", 40))
        .updates(Update::new().inc("age", 1))
        .update_many()
        .await
        .unwrap();

    assert_eq!(result.modified_count, 2);
    assert_eq!(stored(&store, "grace").await.get("age"), Some(&json!(86)));
    assert_eq!(stored(&store, "ada").await.get("age"), Some(&json!(36)));
}

#[tokio::test]
async fn update_fires_only_update_phases() {
    let (store, registry, users) = users();
    seed(&store, "users", &people()).await;
    let log = CallLog::new();
    for phase in OperationPhase::ALL {
        registry.register(phase, "log", log.callback("global"));
    }

    users
        .updater()
        .filter(Filter::new().eq("name", "ada"))
        .updates(Update::new().set("age", 1))
        .update_one()
        .await
        .unwrap();

    assert_eq!(log.entries(), vec!["global:beforeUpdate", "global:afterUpdate"]);
}

#[tokio::test]
async fn replacement_swaps_the_whole_document() {
    let (store, _registry, users) = users();
    seed(&store, "users", &people()).await;
    let id = stored(&store, "grace").await.get("_id").cloned();

    let result = users
        .updater()
        .filter(Filter::new().eq("name", "grace"))
        .replacement(User::new("grace hopper", 85))
        .update_one()
        .await
        .unwrap();

    assert_eq!(result.modified_count, 1);
    let grace = stored(&store, "grace hopper").await;
    assert_eq!(grace.get("_id").cloned(), id);
}

#[tokio::test]
async fn local_hooks_see_updates_or_replacement() {
    let (store, _registry, users) = users();
    seed(&store, "users", &people()).await;
    let seen = Arc::new(Mutex::new(Vec::new()));

    let log = Arc::clone(&seen);
    users
        .updater()
        .filter(Filter::new().eq("name", "ada"))
        .updates(Update::new().set("age", 1))
        .register_before_hooks(move |ctx| {
            log.lock().unwrap().push((ctx.updates.is_some(), ctx.replacement.is_some()));
            Ok(())
        })
        .update_one()
        .await
        .unwrap();

    let log = Arc::clone(&seen);
    users
        .updater()
        .filter(Filter::new().eq("name", "ada"))
        .replacement(User::new("ada", 2))
        .register_before_hooks(move |ctx| {
            log.lock().unwrap().push((ctx.updates.is_some(), ctx.replacement.is_some()));
            Ok(())
        })
        .update_one()
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![(true, false), (false, true)]);
}

#[tokio::test]
async fn local_after_hook_receives_the_result() {
    let (store, _registry, users) = users();
    seed(&store, "users", &people()).await;
    let matched = Arc::new(Mutex::new(None));

    let slot = Arc::clone(&matched);
    users
        .updater()
        .updates(Update::new().set("active", true))
        .register_after_hooks(move |ctx| {
            *slot.lock().unwrap() = ctx.result.map(|r| r.matched_count);
            Ok(())
        })
        .update_many()
        .await
        .unwrap();

    assert_eq!(*matched.lock().unwrap(), Some(3));
}

// ── upsert ──────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_inserts_with_id_and_timestamps() {
    let (store, _registry, users) = users_with_plugins();

    let result = users
        .updater()
        .filter(Filter::new().eq("name", "linus"))
        .updates(Update::new().set("age", 54))
        .upsert()
        .await
        .unwrap();

    let linus = stored(&store, "linus").await;
    assert_eq!(result.upserted_id.as_ref(), linus.get("_id"));
    assert_eq!(linus.get("age"), Some(&json!(54)));
    assert!(linus.contains_key("created_at"));
    assert!(linus.contains_key("updated_at"));
}

#[tokio::test]
async fn upsert_on_match_keeps_creation_fields() {
    let (store, _registry, users) = users_with_plugins();
    seed(&store, "users", &people()).await;
    let original_id = stored(&store, "ada").await.get("_id").cloned();

    let result = users
        .updater()
        .filter(Filter::new().eq("name", "ada"))
        .updates(Update::new().set("age", 40))
        .upsert()
        .await
        .unwrap();

    assert_eq!(result.upserted_id, None);
    let ada = stored(&store, "ada").await;
    assert_eq!(ada.get("_id").cloned(), original_id);
    assert!(!ada.contains_key("created_at"));
    assert!(ada.contains_key("updated_at"));
}

#[tokio::test]
async fn upsert_by_id_keeps_the_filter_id() {
    let (store, _registry, users) = users_with_plugins();
    let id = ObjectId::new();

    let first = users
        .updater()
        .filter(Filter::by_id(id))
        .updates(Update::new().set("name", "linus").set("age", 54))
        .upsert()
        .await
        .unwrap();
    assert_eq!(first.upserted_id, Some(json!(id)));

    let second = users
        .updater()
        .filter(Filter::by_id(id))
        .updates(Update::new().set("age", 55))
        .upsert()
        .await
        .unwrap();
    assert_eq!(second.upserted_id, None);
    assert_eq!(second.matched_count, 1);

    let docs = store.documents("users").await;
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].get("_id"), Some(&json!(id)));
    assert_eq!(docs[0].get("age"), Some(&json!(55)));
}

#[tokio::test]
async fn upsert_fires_only_upsert_phases() {
    let (_store, registry, users) = users();
    let log = CallLog::new();
    for phase in OperationPhase::ALL {
        registry.register(phase, "log", log.callback("global"));
    }

    users
        .updater()
        .filter(Filter::new().eq("name", "linus"))
        .updates(Update::new().set("age", 54))
        .upsert()
        .await
        .unwrap();

    assert_eq!(log.entries(), vec!["global:beforeUpsert", "global:afterUpsert"]);
}

#[tokio::test]
async fn invalid_replacement_blocks_upsert() {
    let (store, _registry, users) = users_with_plugins();

    let err = users
        .updater()
        .filter(Filter::new().eq("name", "nobody"))
        .replacement(User::new("nobody", -5))
        .upsert()
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Hook(_)));
    assert_eq!(
        err.validation_errors().map(|v| v.field("age").count()),
        Some(1)
    );
    assert!(store.is_empty("users").await);
}

#[tokio::test]
async fn valid_replacement_is_upserted() {
    let (store, _registry, users) = users_with_plugins();

    let result = users
        .updater()
        .filter(Filter::new().eq("name", "linus"))
        .replacement(User::new("linus", 54))
        .upsert()
        .await
        .unwrap();

    assert!(result.upserted_id.is_some());
    assert_eq!(stored(&store, "linus").await.get("age"), Some(&json!(54)));
}

#[tokio::test]
async fn after_upsert_failure_is_reported_as_committed() {
    let (store, registry, users) = users();
    registry.register(OperationPhase::AfterUpsert, "audit", rejecting("audit down"));

    let err = users
        .updater()
        .filter(Filter::new().eq("name", "linus"))
        .updates(Update::new().set("age", 54))
        .upsert()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::AfterCommit {
            phase: OperationPhase::AfterUpsert,
            ..
        }
    ));
    assert_eq!(store.len("users").await, 1);
}
