//! Function table.
//!
//! Built-in functions are registered once per table as ready descriptors.
//! Functions written in a manifest are registered by statement; their
//! descriptor is built on first call (parameter types have to be resolved
//! first) and cached.

mod builtins;

use std::sync::Arc;

use mar_ir::{FunctionStatement, Location, Position};
use rustc_hash::FxHashMap;

use crate::dispatch::Descriptor;
use crate::errors::{EvalError, EvalErrorKind};

/// A function defined with `function name(...) { ... }`.
#[derive(Clone, Debug)]
pub struct SourceFunction {
    statement: Arc<FunctionStatement>,
    location: Location,
    descriptor: Option<Arc<Descriptor>>,
}

impl SourceFunction {
    pub fn statement(&self) -> &Arc<FunctionStatement> {
        &self.statement
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The descriptor, once built.
    pub fn descriptor(&self) -> Option<Arc<Descriptor>> {
        self.descriptor.clone()
    }
}

#[derive(Clone, Debug)]
pub struct FunctionTable {
    builtins: FxHashMap<&'static str, Arc<Descriptor>>,
    source: FxHashMap<String, SourceFunction>,
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FunctionTable {
    /// A table holding only the built-in functions.
    pub fn builtin() -> Self {
        let builtins = builtins::descriptors()
            .into_iter()
            .map(|(name, descriptor)| (name, Arc::new(descriptor)))
            .collect();
        FunctionTable {
            builtins,
            source: FxHashMap::default(),
        }
    }

    /// Register a source-defined function.
    pub fn define(
        &mut self,
        statement: Arc<FunctionStatement>,
        location: Location,
    ) -> Result<(), EvalError> {
        let name = statement.name.as_str();
        let previous = if self.builtins.contains_key(name) {
            Some(Location::new(Arc::from("<builtin>"), Position::DUMMY))
        } else {
            self.source.get(name).map(|existing| existing.location.clone())
        };
        if let Some(previous) = previous {
            return Err(EvalError::new(EvalErrorKind::DuplicateFunction {
                name: name.to_string(),
                previous,
            })
            .at(location));
        }

        self.source.insert(
            name.to_string(),
            SourceFunction {
                statement,
                location,
                descriptor: None,
            },
        );
        Ok(())
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.builtins.contains_key(name) || self.source.contains_key(name)
    }

    pub fn builtin_descriptor(&self, name: &str) -> Option<Arc<Descriptor>> {
        self.builtins.get(name).cloned()
    }

    pub fn source(&self, name: &str) -> Option<&SourceFunction> {
        self.source.get(name)
    }

    pub(crate) fn cache(&mut self, name: &str, descriptor: Arc<Descriptor>) {
        if let Some(function) = self.source.get_mut(name) {
            function.descriptor = Some(descriptor);
        }
    }
}
