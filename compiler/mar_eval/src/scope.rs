//! Variable scopes.
//!
//! All scopes of one compilation live in a [`ScopeArena`] and refer to
//! their parent by [`ScopeId`] handle, so growing the arena never
//! invalidates a parent link. Named scopes (the top scope and one per
//! evaluated class) are registered by name for qualified lookups such as
//! `$apache::port`. Unnamed scopes back function, lambda and defined-type
//! bodies and are released when their body finishes.

use mar_ir::Location;
use mar_types::Value;
use rustc_hash::FxHashMap;

use crate::errors::{EvalError, EvalErrorKind};

/// Handle to a scope in a [`ScopeArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ScopeId(u32);

impl ScopeId {
    /// The top scope; always the first scope of an arena.
    pub const TOP: ScopeId = ScopeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A variable binding and where it was made.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    pub value: Value,
    pub origin: Location,
}

/// One scope: local bindings plus a parent link.
#[derive(Clone, Debug)]
pub struct Scope {
    name: String,
    display_name: String,
    parent: Option<ScopeId>,
    variables: FxHashMap<String, Variable>,
}

impl Scope {
    fn new(name: String, display_name: String, parent: Option<ScopeId>) -> Self {
        Scope {
            name,
            display_name,
            parent,
            variables: FxHashMap::default(),
        }
    }

    /// Scope name; the normalised class name, or empty for the top scope.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human readable name, e.g. `Class[main]`.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Lookup in this scope only.
    pub fn local(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Bind `name` in this scope.
    ///
    /// Assignment is single-write: binding a name already bound in this
    /// scope fails, even when a parent scope binds the same name.
    pub fn set(&mut self, name: &str, value: Value, origin: Location) -> Result<(), EvalError> {
        if let Some(previous) = self.variables.get(name) {
            return Err(EvalError::new(EvalErrorKind::ReassignedVariable {
                name: name.to_string(),
                previous: previous.origin.clone(),
            })
            .at(origin));
        }
        self.variables
            .insert(name.to_string(), Variable { value, origin });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Owner of every scope in a compilation.
#[derive(Clone, Debug)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
    by_name: FxHashMap<String, ScopeId>,
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeArena {
    /// Create an arena holding only the top scope (`Class[main]`).
    pub fn new() -> Self {
        let mut by_name = FxHashMap::default();
        by_name.insert(String::new(), ScopeId::TOP);
        ScopeArena {
            scopes: vec![Scope::new(String::new(), "Class[main]".to_string(), None)],
            by_name,
        }
    }

    /// Add a named scope, or return the existing scope of that name.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        display_name: impl Into<String>,
        parent: Option<ScopeId>,
    ) -> ScopeId {
        let name = name.into();
        if let Some(&id) = self.by_name.get(&name) {
            return id;
        }
        let id = self.next_id();
        self.scopes
            .push(Scope::new(name.clone(), display_name.into(), parent));
        self.by_name.insert(name, id);
        id
    }

    /// Add an unnamed scope for a function, lambda or defined-type body.
    pub fn add_ephemeral(&mut self, display_name: impl Into<String>, parent: ScopeId) -> ScopeId {
        let id = self.next_id();
        self.scopes
            .push(Scope::new(String::new(), display_name.into(), Some(parent)));
        id
    }

    /// Release an unnamed scope. Only the most recently added scope can be
    /// released; scopes added after it stay alive, and so does it.
    ///
    /// Scope ids are arena indices, so a body that declared a class keeps
    /// its unnamed scope until the compilation ends. The arena only grows.
    pub fn release_ephemeral(&mut self, id: ScopeId) {
        let is_last = id.index() + 1 == self.scopes.len();
        let is_named = self.by_name.get(self.scopes[id.index()].name()) == Some(&id);
        if is_last && !is_named {
            self.scopes.pop();
        }
    }

    fn next_id(&self) -> ScopeId {
        // More than u32::MAX scopes would exhaust memory long before.
        ScopeId(u32::try_from(self.scopes.len()).unwrap_or(u32::MAX))
    }

    pub fn find(&self, name: &str) -> Option<ScopeId> {
        self.by_name.get(name).copied()
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    pub fn top(&self) -> ScopeId {
        ScopeId::TOP
    }

    /// Search `id`, then its parent chain, for the nearest binding.
    pub fn get(&self, id: ScopeId, name: &str) -> Option<&Variable> {
        let mut current = Some(id);
        while let Some(scope_id) = current {
            let scope = self.scope(scope_id);
            if let Some(variable) = scope.local(name) {
                return Some(variable);
            }
            current = scope.parent();
        }
        None
    }

    pub fn set(
        &mut self,
        id: ScopeId,
        name: &str,
        value: Value,
        origin: Location,
    ) -> Result<(), EvalError> {
        self.scope_mut(id).set(name, value, origin)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}
