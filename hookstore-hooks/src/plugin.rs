//! Built-in plugins and their process configuration.
//!
//! The three built-in strategies are ordinary named callbacks; installing
//! them is just registering closures under fixed names. `PluginConfig`
//! decides which ones a registry receives and which validator the
//! validation plugin uses.

use hookstore_model::StructValidator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::validation::Validation;
use crate::{CallbackRegistry, HookResult, OperationContext, OperationPhase, field, global, model_hook};

/// Registry name of the field-default plugin.
pub const DEFAULT_FIELD_PLUGIN: &str = "hookstore:default_field";
/// Registry name of the model-hook plugin.
pub const MODEL_HOOK_PLUGIN: &str = "hookstore:model";
/// Registry name of the validation plugin.
pub const VALIDATION_PLUGIN: &str = "hookstore:validation";

/// Phases the field-default plugin is installed on.
pub const DEFAULT_FIELD_PHASES: [OperationPhase; 3] = [
    OperationPhase::BeforeInsert,
    OperationPhase::BeforeUpdate,
    OperationPhase::BeforeUpsert,
];

/// Phases the validation plugin is installed on.
pub const VALIDATION_PHASES: [OperationPhase; 2] =
    [OperationPhase::BeforeInsert, OperationPhase::BeforeUpsert];

/// Which built-in plugins to install.
///
/// Deserializable from TOML:
///
/// ```toml
/// enable_default_field_hook = true
/// enable_model_hook = true
/// enable_validation_hook = false
/// ```
///
/// The validator override cannot come from a file; set it with
/// [`PluginConfig::with_validator`].
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    pub enable_default_field_hook: bool,
    pub enable_model_hook: bool,
    pub enable_validation_hook: bool,
    /// Replaces the default [`TagValidator`](hookstore_model::TagValidator).
    #[serde(skip)]
    pub validator: Option<Arc<dyn StructValidator>>,
}

impl PluginConfig {
    /// Every built-in plugin enabled, default validator.
    pub fn enable_all() -> Self {
        Self {
            enable_default_field_hook: true,
            enable_model_hook: true,
            enable_validation_hook: true,
            validator: None,
        }
    }

    #[must_use]
    pub fn with_validator(mut self, validator: impl StructValidator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Parses a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Loads configuration from a TOML file.
    ///
    /// A missing, unreadable or unparsable file yields the default
    /// configuration (nothing enabled).
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No plugin config found at {:?}, no plugins enabled", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!("Loaded plugin config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!(
                        "Failed to parse plugin config {:?}: {}. Falling back to defaults.",
                        path, e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read plugin config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Registers the enabled plugins on `registry`.
    pub fn install(&self, registry: &CallbackRegistry) {
        if self.enable_default_field_hook {
            registry.register_many(&DEFAULT_FIELD_PHASES, DEFAULT_FIELD_PLUGIN, field::execute);
        }
        if self.enable_model_hook {
            registry.register_many(&OperationPhase::ALL, MODEL_HOOK_PLUGIN, model_hook::execute);
        }
        if self.enable_validation_hook {
            let validation = match &self.validator {
                Some(validator) => Validation::new(Arc::clone(validator)),
                None => Validation::default(),
            };
            registry.register_many(&VALIDATION_PHASES, VALIDATION_PLUGIN, move |ctx, phase| {
                validation.execute(ctx, phase)
            });
        }
        info!(
            default_field = self.enable_default_field_hook,
            model_hook = self.enable_model_hook,
            validation = self.enable_validation_hook,
            custom_validator = self.validator.is_some(),
            "installed built-in plugins"
        );
    }

    /// Removes every built-in plugin from `registry`, enabled or not.
    pub fn uninstall(registry: &CallbackRegistry) {
        for phase in DEFAULT_FIELD_PHASES {
            registry.remove(phase, DEFAULT_FIELD_PLUGIN);
        }
        for phase in OperationPhase::ALL {
            registry.remove(phase, MODEL_HOOK_PLUGIN);
        }
        for phase in VALIDATION_PHASES {
            registry.remove(phase, VALIDATION_PLUGIN);
        }
    }
}

impl fmt::Debug for PluginConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginConfig")
            .field("enable_default_field_hook", &self.enable_default_field_hook)
            .field("enable_model_hook", &self.enable_model_hook)
            .field("enable_validation_hook", &self.enable_validation_hook)
            .field("validator", &self.validator.as_ref().map(|_| "custom"))
            .finish()
    }
}

/// Registers a callback on the global registry.
pub fn register_plugin<F>(name: &str, phase: OperationPhase, callback: F)
where
    F: Fn(&mut OperationContext<'_>, OperationPhase) -> HookResult + Send + Sync + 'static,
{
    global().register(phase, name, callback);
}

/// Removes a callback from the global registry.
pub fn remove_plugin(name: &str, phase: OperationPhase) {
    global().remove(phase, name);
}

/// Installs the built-in plugins `config` enables on the global registry.
pub fn init_plugins(config: &PluginConfig) {
    config.install(&global());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PluginConfig::from_toml_str("enable_model_hook = true").unwrap();
        assert!(config.enable_model_hook);
        assert!(!config.enable_default_field_hook);
        assert!(!config.enable_validation_hook);
        assert!(config.validator.is_none());
    }

    #[test]
    fn install_registers_expected_phases() {
        let registry = CallbackRegistry::new();
        PluginConfig::enable_all().install(&registry);

        assert_eq!(registry.len(), 3 + 10 + 2);
        assert_eq!(
            registry.names(OperationPhase::BeforeInsert),
            vec![DEFAULT_FIELD_PLUGIN, MODEL_HOOK_PLUGIN, VALIDATION_PLUGIN]
        );
        assert_eq!(registry.names(OperationPhase::AfterFind), vec![MODEL_HOOK_PLUGIN]);
    }

    #[test]
    fn uninstall_leaves_user_callbacks() {
        let registry = CallbackRegistry::new();
        PluginConfig::enable_all().install(&registry);
        registry.register(OperationPhase::BeforeDelete, "audit", |_, _| Ok(()));

        PluginConfig::uninstall(&registry);

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(OperationPhase::BeforeDelete, "audit"));
    }
}
