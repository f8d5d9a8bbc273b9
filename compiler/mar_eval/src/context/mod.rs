//! The evaluation context.
//!
//! [`EvaluationContext`] owns everything one compilation mutates: the scope
//! arena and scope stack, the class table, defined types, the operator and
//! function tables, and the diagnostic queue. The catalog is borrowed; the
//! context only creates and looks up resource nodes through [`Catalog`].
//!
//! # Module Structure
//!
//! - `classes`: the define/declare protocol for classes and defined types
//! - `scope_guard`: RAII guard for the scope stack

mod classes;
mod scope_guard;

use std::sync::Arc;

use mar_diagnostic::{DiagnosticQueue, ErrorGuaranteed, Severity};
use mar_ir::{DefinedTypeStatement, Location, Position};
use mar_types::Value;
use rustc_hash::FxHashMap;

use crate::catalog::Catalog;
use crate::class_definition::{ClassDefinition, ClassName};
use crate::errors::{EvalError, EvalErrorKind, EvalResult};
use crate::functions::FunctionTable;
use crate::operators::OperatorTable;
use crate::scope::{Scope, ScopeArena, ScopeId, Variable};
use crate::settings::EvalSettings;

pub use scope_guard::ScopedContext;

/// A registered `define`.
#[derive(Clone, Debug)]
pub struct DefinedType {
    pub name: String,
    pub statement: Arc<DefinedTypeStatement>,
    pub location: Location,
}

/// State of one compilation.
pub struct EvaluationContext<'c> {
    catalog: &'c mut dyn Catalog,
    settings: EvalSettings,
    diagnostics: DiagnosticQueue,
    scopes: ScopeArena,
    /// Never empty; the bottom entry is the top scope.
    stack: Vec<ScopeId>,
    classes: FxHashMap<ClassName, Vec<ClassDefinition>>,
    /// Classes whose parent is being declared, outermost first.
    resolving: Vec<ClassName>,
    /// Classes whose body is being evaluated, outermost first.
    evaluating: Vec<ClassName>,
    defined_types: FxHashMap<String, DefinedType>,
    functions: FunctionTable,
    operators: OperatorTable,
    /// Path of the manifest whose nodes are being evaluated.
    unit: Arc<str>,
}

impl<'c> EvaluationContext<'c> {
    pub fn new(catalog: &'c mut dyn Catalog, settings: EvalSettings) -> Self {
        let diagnostics = DiagnosticQueue::with_config(settings.diagnostics.clone());
        let scopes = ScopeArena::new();
        let top = scopes.top();
        EvaluationContext {
            catalog,
            settings,
            diagnostics,
            scopes,
            stack: vec![top],
            classes: FxHashMap::default(),
            resolving: Vec::new(),
            evaluating: Vec::new(),
            defined_types: FxHashMap::default(),
            functions: FunctionTable::builtin(),
            operators: OperatorTable::builtin(),
            unit: Arc::from(""),
        }
    }

    pub fn settings(&self) -> &EvalSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &dyn Catalog {
        &*self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut dyn Catalog {
        &mut *self.catalog
    }

    // Diagnostics

    pub fn diagnostics(&self) -> &DiagnosticQueue {
        &self.diagnostics
    }

    /// Release the catalog borrow, keeping what was reported.
    pub fn into_diagnostics(self) -> DiagnosticQueue {
        self.diagnostics
    }

    /// Record a message. Returns a guarantee for errors.
    pub fn log(
        &mut self,
        severity: Severity,
        location: Option<Location>,
        message: impl Into<String>,
    ) -> Option<ErrorGuaranteed> {
        self.diagnostics.log(severity, location, message)
    }

    /// Report `error` unless it already was.
    pub fn report(&mut self, error: &EvalError) -> ErrorGuaranteed {
        match error.guarantee() {
            Some(guarantee) => guarantee,
            None => self.diagnostics.emit_error(error.to_diagnostic()),
        }
    }

    // Compilation units

    /// Path of the manifest currently being evaluated.
    pub fn unit(&self) -> &Arc<str> {
        &self.unit
    }

    /// Location of `position` in the current manifest.
    pub fn location(&self, position: Position) -> Location {
        Location::new(self.unit.clone(), position)
    }

    /// Run `f` with `path` as the current manifest.
    pub fn with_unit<T>(&mut self, path: Arc<str>, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = std::mem::replace(&mut self.unit, path);
        let result = f(self);
        self.unit = previous;
        result
    }

    // Scopes

    pub fn scopes(&self) -> &ScopeArena {
        &self.scopes
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        self.scopes.scope(id)
    }

    pub fn top_scope(&self) -> ScopeId {
        self.scopes.top()
    }

    pub fn current_scope(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or(ScopeId::TOP)
    }

    /// Add a named scope, or return the existing one of that name.
    pub fn add_scope(
        &mut self,
        name: &str,
        display_name: impl Into<String>,
        parent: Option<ScopeId>,
    ) -> ScopeId {
        self.scopes.add(name, display_name, parent)
    }

    pub fn find_scope(&self, name: &str) -> Option<ScopeId> {
        self.scopes.find(name)
    }

    /// Make `scope` current. Prefer [`EvaluationContext::with_scope`].
    pub fn push_scope(&mut self, scope: ScopeId) {
        tracing::trace!(scope = %self.scopes.scope(scope).display_name(), "push scope");
        self.stack.push(scope);
    }

    /// Restore the previous scope. Refuses to pop the top scope.
    pub fn pop_scope(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        self.stack.pop();
        true
    }

    /// Number of scopes on the stack, including the top scope.
    pub fn scope_depth(&self) -> usize {
        self.stack.len()
    }

    // Variables

    /// Resolve `$name`, `$class::name` or `$::name`.
    pub fn lookup_variable(&self, name: &str, location: &Location) -> EvalResult {
        match self.find_variable(name) {
            Some(variable) => Ok(variable.value.clone()),
            None if self.settings.strict_variables => {
                Err(EvalError::new(EvalErrorKind::UndefinedVariable {
                    name: name.to_string(),
                })
                .at(location.clone()))
            }
            None => Ok(Value::Undef),
        }
    }

    /// The binding `name` refers to from the current scope, if any.
    pub fn find_variable(&self, name: &str) -> Option<&Variable> {
        let (scope, variable) = match name.strip_prefix("::") {
            Some(rest) => match rest.rsplit_once("::") {
                Some((class, variable)) => (self.class_scope(class), variable),
                None => (Some(self.top_scope()), rest),
            },
            None => match name.rsplit_once("::") {
                Some((class, variable)) => (self.class_scope(class), variable),
                None => (Some(self.current_scope()), name),
            },
        };
        scope.and_then(|scope| self.scopes.get(scope, variable))
    }

    fn class_scope(&self, class: &str) -> Option<ScopeId> {
        self.scopes.find(ClassName::new(class).as_str())
    }

    /// Bind `name` in the current scope.
    pub fn set_variable(&mut self, name: &str, value: Value, origin: Location) -> Result<(), EvalError> {
        let scope = self.current_scope();
        self.scopes.set(scope, name, value, origin)
    }

    /// Bind `name` in `scope`.
    pub fn set_variable_in(
        &mut self,
        scope: ScopeId,
        name: &str,
        value: Value,
        origin: Location,
    ) -> Result<(), EvalError> {
        self.scopes.set(scope, name, value, origin)
    }

    pub(crate) fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    pub(crate) fn functions_mut(&mut self) -> &mut FunctionTable {
        &mut self.functions
    }

    pub(crate) fn operators(&self) -> &OperatorTable {
        &self.operators
    }

    pub(crate) fn scopes_mut(&mut self) -> &mut ScopeArena {
        &mut self.scopes
    }
}

#[cfg(test)]
mod tests;
