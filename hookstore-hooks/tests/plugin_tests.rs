use hookstore_hooks::{
    DEFAULT_FIELD_PLUGIN, HookError, MODEL_HOOK_PLUGIN, OperationContext, OperationPhase,
    PluginConfig, VALIDATION_PLUGIN, global, register_plugin, remove_plugin,
};
use hookstore_model::{Base, DefaultFields, Model};
use hookstore_types::{UpdateExpr, UpdateOperator};

fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plugins.toml");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn load_from_missing_file_is_default() {
    let dir = tempfile::tempdir().unwrap();
    let config = PluginConfig::load_from(dir.path().join("nonexistent.toml"));
    assert!(!config.enable_default_field_hook);
    assert!(!config.enable_model_hook);
    assert!(!config.enable_validation_hook);
}

#[test]
fn load_from_reads_flags() {
    let (_dir, path) = write_config(
        r#"
enable_default_field_hook = true
enable_model_hook = false
enable_validation_hook = true
"#,
    );
    let config = PluginConfig::load_from(&path);
    assert!(config.enable_default_field_hook);
    assert!(!config.enable_model_hook);
    assert!(config.enable_validation_hook);
}

#[test]
fn load_from_invalid_toml_falls_back() {
    let (_dir, path) = write_config("enable_model_hook = \"sometimes\"");
    let config = PluginConfig::load_from(&path);
    assert!(!config.enable_model_hook);
}

#[test]
fn disabled_plugins_are_not_installed() {
    let registry = hookstore_hooks::CallbackRegistry::new();
    PluginConfig {
        enable_default_field_hook: true,
        ..PluginConfig::default()
    }
    .install(&registry);

    assert!(registry.contains(OperationPhase::BeforeUpsert, DEFAULT_FIELD_PLUGIN));
    assert!(!registry.contains(OperationPhase::BeforeInsert, VALIDATION_PLUGIN));
    assert!(!registry.contains(OperationPhase::AfterFind, MODEL_HOOK_PLUGIN));
    assert_eq!(registry.len(), 3);
}

#[test]
fn installed_default_field_plugin_runs() {
    struct Post(Base);

    impl Model for Post {
        fn as_default_fields(&mut self) -> Option<&mut dyn DefaultFields> {
            Some(&mut self.0)
        }
    }

    let registry = hookstore_hooks::CallbackRegistry::new();
    PluginConfig::enable_all().install(&registry);

    let mut post = Post(Base::default());
    let mut updates = UpdateExpr::default();
    let mut ctx = OperationContext::new("posts")
        .with_document(&mut post)
        .with_updates(&mut updates);
    registry.execute(&mut ctx, &[OperationPhase::BeforeUpdate]).unwrap();
    drop(ctx);

    let set = updates.as_operators().unwrap().section(UpdateOperator::Set).unwrap();
    assert!(set.contains_key("updated_at"));
}

#[test]
fn global_helpers_register_and_remove() {
    let name = "plugin_tests:global_helpers";
    register_plugin(name, OperationPhase::BeforeDelete, |_, _| {
        Err(HookError::rejected("read-only"))
    });
    assert!(global().contains(OperationPhase::BeforeDelete, name));

    remove_plugin(name, OperationPhase::BeforeDelete);
    assert!(!global().contains(OperationPhase::BeforeDelete, name));
}
