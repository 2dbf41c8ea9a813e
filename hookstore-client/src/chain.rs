//! Per-wrapper ordered hook lists.

use hookstore_hooks::HookResult;
use std::fmt;
use std::sync::Arc;

/// An ordered list of local hooks of one signature.
///
/// `H` is the unsized hook type, e.g. [`CreatorHookFn<T>`](crate::CreatorHookFn).
pub(crate) struct HookChain<H: ?Sized> {
    hooks: Vec<Arc<H>>,
}

impl<H: ?Sized> HookChain<H> {
    pub(crate) fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    pub(crate) fn add(&mut self, hook: Arc<H>) {
        self.hooks.push(hook);
    }

    pub(crate) fn len(&self) -> usize {
        self.hooks.len()
    }

    pub(crate) fn clear(&mut self) {
        self.hooks.clear();
    }

    /// Calls `invoke` on every hook in order, stopping at the first error.
    pub(crate) fn run(&self, mut invoke: impl FnMut(&H) -> HookResult) -> HookResult {
        for hook in &self.hooks {
            invoke(hook)?;
        }
        Ok(())
    }
}

impl<H: ?Sized> Default for HookChain<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ?Sized> Clone for HookChain<H> {
    fn clone(&self) -> Self {
        Self {
            hooks: self.hooks.clone(),
        }
    }
}

impl<H: ?Sized> fmt::Debug for HookChain<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookChain").field("len", &self.len()).finish()
    }
}
