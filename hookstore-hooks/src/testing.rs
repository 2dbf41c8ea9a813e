//! Test utilities for the hook pipeline.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::{HookError, HookResult, OperationContext, OperationPhase};

/// Records labels in invocation order. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, label: impl Into<String>) {
        self.lock().push(label.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// A registry callback that appends `label:phase` and succeeds.
    pub fn callback(
        &self,
        label: &str,
    ) -> impl Fn(&mut OperationContext<'_>, OperationPhase) -> HookResult + Send + Sync + 'static
    {
        let log = self.clone();
        let label = label.to_string();
        move |_ctx, phase| {
            log.push(format!("{label}:{phase}"));
            Ok(())
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Counts invocations. Clones share the same count.
#[derive(Debug, Clone, Default)]
pub struct CallCounter {
    count: Arc<AtomicUsize>,
}

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// A registry callback that counts and succeeds.
    pub fn callback(
        &self,
    ) -> impl Fn(&mut OperationContext<'_>, OperationPhase) -> HookResult + Send + Sync + 'static
    {
        let counter = self.clone();
        move |_ctx, _phase| {
            counter.hit();
            Ok(())
        }
    }
}

/// A registry callback that always rejects with `reason`.
pub fn rejecting(
    reason: &str,
) -> impl Fn(&mut OperationContext<'_>, OperationPhase) -> HookResult + Send + Sync + 'static {
    let reason = reason.to_string();
    move |_ctx, _phase| Err(HookError::rejected(reason.clone()))
}
