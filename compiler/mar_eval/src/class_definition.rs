//! Deferred class definitions.
//!
//! A class statement is registered as a [`ClassDefinition`] when it is
//! found and evaluated only when the class is first declared. The
//! definition keeps its statement until then; once evaluated, the
//! statement is released and the definition never evaluates again.

use std::fmt;
use std::sync::Arc;

use mar_ir::{ClassStatement, Location};

use crate::catalog::{capitalize_segments, ResourceKey};

/// Normalised class name: lower-cased, without a leading `::`.
#[derive(Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct ClassName(String);

impl ClassName {
    pub fn new(name: &str) -> Self {
        ClassName(name.trim_start_matches("::").to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form, e.g. `Class[Apache::Vhost]`.
    pub fn display_name(&self) -> String {
        format!("Class[{}]", capitalize_segments(&self.0))
    }

    pub fn resource_key(&self) -> ResourceKey {
        ResourceKey::class(self.0.clone())
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug)]
enum ClassState {
    Unevaluated(Arc<ClassStatement>),
    Evaluated,
}

/// One definition of a class.
#[derive(Clone, Debug)]
pub struct ClassDefinition {
    name: ClassName,
    /// Where the class statement was written.
    location: Location,
    parent: Option<ClassName>,
    state: ClassState,
}

impl ClassDefinition {
    pub fn new(name: ClassName, statement: Arc<ClassStatement>, location: Location) -> Self {
        let parent = statement
            .parent
            .as_ref()
            .map(|parent| ClassName::new(parent.as_str()));
        ClassDefinition {
            name,
            location,
            parent,
            state: ClassState::Unevaluated(statement),
        }
    }

    pub fn name(&self) -> &ClassName {
        &self.name
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn path(&self) -> &Arc<str> {
        &self.location.path
    }

    pub fn line(&self) -> u32 {
        self.location.line()
    }

    pub fn parent(&self) -> Option<&ClassName> {
        self.parent.as_ref()
    }

    pub fn is_evaluated(&self) -> bool {
        matches!(self.state, ClassState::Evaluated)
    }

    /// The statement awaiting evaluation, if any.
    pub fn statement(&self) -> Option<&Arc<ClassStatement>> {
        match &self.state {
            ClassState::Unevaluated(statement) => Some(statement),
            ClassState::Evaluated => None,
        }
    }

    /// Release the statement. Permanent.
    pub(crate) fn mark_evaluated(&mut self) {
        self.state = ClassState::Evaluated;
    }

    /// Whether defining `other` next to this definition would give the class
    /// two different parents.
    pub fn conflicts_with(&self, other: &ClassDefinition) -> bool {
        match (&self.parent, &other.parent) {
            (Some(mine), Some(theirs)) => mine != theirs,
            _ => false,
        }
    }
}
