//! RAII guard for the scope stack.
//!
//! [`ScopedContext`] pushes a scope on construction and pops it on drop,
//! including when the enclosed evaluation returns early with an error. It
//! derefs to the [`EvaluationContext`], so code inside the guard uses the
//! context as usual.
//!
//! ```text
//! context.with_scope(class_scope, |scoped| scoped.evaluate_statements(body))
//! ```

use std::ops::{Deref, DerefMut};

use super::EvaluationContext;
use crate::scope::ScopeId;

/// Guard that restores the previous current scope on drop.
pub struct ScopedContext<'guard, 'c> {
    context: &'guard mut EvaluationContext<'c>,
    /// Unnamed scope to release on drop.
    ephemeral: Option<ScopeId>,
}

impl Drop for ScopedContext<'_, '_> {
    fn drop(&mut self) {
        self.context.pop_scope();
        if let Some(scope) = self.ephemeral {
            self.context.scopes_mut().release_ephemeral(scope);
        }
    }
}

impl<'c> Deref for ScopedContext<'_, 'c> {
    type Target = EvaluationContext<'c>;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl DerefMut for ScopedContext<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl<'c> EvaluationContext<'c> {
    /// Make `scope` current until the returned guard is dropped.
    pub fn scoped(&mut self, scope: ScopeId) -> ScopedContext<'_, 'c> {
        self.push_scope(scope);
        ScopedContext {
            context: self,
            ephemeral: None,
        }
    }

    /// Run `f` with `scope` as the current scope.
    pub fn with_scope<T, F>(&mut self, scope: ScopeId, f: F) -> T
    where
        F: FnOnce(&mut ScopedContext<'_, 'c>) -> T,
    {
        let mut scoped = self.scoped(scope);
        f(&mut scoped)
    }

    /// Run `f` in a fresh unnamed scope chained to `parent`. The scope is
    /// released afterwards.
    pub fn with_ephemeral_scope<T, F>(&mut self, display_name: &str, parent: ScopeId, f: F) -> T
    where
        F: FnOnce(&mut ScopedContext<'_, 'c>) -> T,
    {
        let scope = self.scopes_mut().add_ephemeral(display_name, parent);
        self.push_scope(scope);
        let mut scoped = ScopedContext {
            context: self,
            ephemeral: Some(scope),
        };
        f(&mut scoped)
    }
}
