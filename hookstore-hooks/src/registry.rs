//! Callback registry: named, phase-scoped callbacks run in registration
//! order.
//!
//! Each phase maps to an `Arc<Vec<_>>` snapshot. Writers copy the list,
//! edit it and swap it in under the write lock; `execute` only clones the
//! `Arc` under the read lock and runs the callbacks with no lock held, so a
//! callback may itself register or remove entries. Concurrent writers never
//! tear a list a reader is iterating.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::{HookResult, OperationContext, OperationPhase};

/// A registered callback. Receives the call's context and the phase being
/// executed.
pub type Callback =
    Arc<dyn Fn(&mut OperationContext<'_>, OperationPhase) -> HookResult + Send + Sync>;

#[derive(Clone)]
struct Entry {
    name: String,
    callback: Callback,
}

/// Ordered callbacks per [`OperationPhase`], keyed by name.
///
/// Registering a name that already exists under a phase replaces that
/// callback in place; its position in the order is kept.
#[derive(Default)]
pub struct CallbackRegistry {
    phases: RwLock<HashMap<OperationPhase, Arc<Vec<Entry>>>>,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` under `phase`.
    pub fn register<F>(&self, phase: OperationPhase, name: impl Into<String>, callback: F)
    where
        F: Fn(&mut OperationContext<'_>, OperationPhase) -> HookResult + Send + Sync + 'static,
    {
        self.register_shared(phase, name, Arc::new(callback));
    }

    /// Registers the same callback under several phases.
    pub fn register_many<F>(&self, phases: &[OperationPhase], name: &str, callback: F)
    where
        F: Fn(&mut OperationContext<'_>, OperationPhase) -> HookResult + Send + Sync + 'static,
    {
        let callback: Callback = Arc::new(callback);
        for &phase in phases {
            self.register_shared(phase, name, Arc::clone(&callback));
        }
    }

    /// Registers an already shared callback under `phase`. A callback with
    /// the same name is replaced in place and keeps its position.
    pub fn register_shared(&self, phase: OperationPhase, name: impl Into<String>, callback: Callback) {
        let name = name.into();
        let mut phases = self.write();
        let entries = Arc::make_mut(phases.entry(phase).or_default());

        if let Some(pos) = entries.iter().position(|e| e.name == name) {
            debug!(phase = %phase, callback = %name, position = pos, "replaced callback");
            entries[pos].callback = callback;
        } else {
            debug!(phase = %phase, callback = %name, position = entries.len(), "registered callback");
            entries.push(Entry { name, callback });
        }
    }

    /// Removes the callback named `name` from `phase`. Returns `true` if one
    /// was removed; a missing name is a no-op.
    pub fn remove(&self, phase: OperationPhase, name: &str) -> bool {
        let mut phases = self.write();
        let Some(entries) = phases.get_mut(&phase) else {
            return false;
        };
        let Some(pos) = entries.iter().position(|e| e.name == name) else {
            return false;
        };

        Arc::make_mut(entries).remove(pos);
        if entries.is_empty() {
            phases.remove(&phase);
        }
        debug!(phase = %phase, callback = name, "removed callback");
        true
    }

    /// Runs every callback of each phase in `phases`, phases in the given
    /// order and callbacks in registration order.
    ///
    /// Returns the first error unchanged; nothing after the failing
    /// callback runs, in this phase or any later one.
    pub fn execute(&self, ctx: &mut OperationContext<'_>, phases: &[OperationPhase]) -> HookResult {
        for &phase in phases {
            let Some(entries) = self.snapshot(phase) else {
                continue;
            };
            for entry in entries.iter() {
                if let Err(err) = (entry.callback)(ctx, phase) {
                    debug!(
                        phase = %phase,
                        callback = %entry.name,
                        error = %err,
                        "callback aborted operation"
                    );
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Returns `true` if `name` is registered under `phase`.
    #[must_use]
    pub fn contains(&self, phase: OperationPhase, name: &str) -> bool {
        self.snapshot(phase)
            .is_some_and(|entries| entries.iter().any(|e| e.name == name))
    }

    /// Callback names under `phase`, in execution order.
    #[must_use]
    pub fn names(&self, phase: OperationPhase) -> Vec<String> {
        self.snapshot(phase)
            .map(|entries| entries.iter().map(|e| e.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Total number of entries across all phases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().values().map(|entries| entries.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.write().clear();
    }

    fn snapshot(&self, phase: OperationPhase) -> Option<Arc<Vec<Entry>>> {
        self.read().get(&phase).cloned()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<OperationPhase, Arc<Vec<Entry>>>> {
        self.phases.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<OperationPhase, Arc<Vec<Entry>>>> {
        self.phases.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phases = self.read();
        let mut map = f.debug_map();
        for phase in OperationPhase::ALL {
            if let Some(entries) = phases.get(&phase) {
                let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
                map.entry(&phase, &names);
            }
        }
        map.finish()
    }
}

static GLOBAL: LazyLock<Arc<CallbackRegistry>> = LazyLock::new(|| Arc::new(CallbackRegistry::new()));

/// The process-wide registry used by wrappers that are not given one.
pub fn global() -> Arc<CallbackRegistry> {
    Arc::clone(&GLOBAL)
}
