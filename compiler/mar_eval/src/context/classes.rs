//! Class, defined type and function registration, and class declaration.
//!
//! Registration ("define") happens in a first pass over a manifest and only
//! records statements. Declaration evaluates a class body at most once per
//! compilation, parent first, and records the class in the catalog.

use std::sync::Arc;

use mar_ir::{ClassStatement, DefinedTypeStatement, Location, Parameter, Stmt};
use mar_types::Value;

use super::{DefinedType, EvaluationContext};
use crate::catalog::ResourceId;
use crate::class_definition::{ClassDefinition, ClassName};
use crate::errors::{internal, EvalError, EvalErrorKind};
use crate::executor::{Bindings, Executor};
use crate::scope::ScopeId;
use crate::stack::with_stack;

/// Names bound by class and defined-type evaluation itself.
pub(crate) const RESERVED_NAMES: [&str; 2] = ["title", "name"];

/// Name of a definition written inside `enclosing`; a leading `::` opts out.
fn qualify(enclosing: Option<&ClassName>, written: &str) -> String {
    match enclosing {
        Some(outer) if !written.starts_with("::") => format!("{outer}::{written}"),
        _ => written.to_string(),
    }
}

impl EvaluationContext<'_> {
    /// Reject reserved and rest parameters of a class or defined type.
    fn validate_parameters(
        &self,
        owner: &str,
        parameters: &[Parameter],
        path: &Arc<str>,
    ) -> Result<(), EvalError> {
        for parameter in parameters {
            let location = Location::new(path.clone(), parameter.name.position);
            if RESERVED_NAMES.contains(&parameter.name()) {
                return Err(EvalError::new(EvalErrorKind::ReservedParameterName {
                    parameter: parameter.name().to_string(),
                })
                .at(location));
            }
            if parameter.captures_rest {
                return Err(EvalError::new(EvalErrorKind::InvalidRestParameter {
                    owner: owner.to_string(),
                    parameter: parameter.name().to_string(),
                })
                .at(location));
            }
        }
        Ok(())
    }

    /// Register a class definition.
    ///
    /// Returns the existing definition when it names a different parent;
    /// the new definition is not registered in that case.
    pub fn define_class(
        &mut self,
        name: ClassName,
        statement: Arc<ClassStatement>,
        path: Arc<str>,
    ) -> Result<Option<&ClassDefinition>, EvalError> {
        self.validate_parameters("class", &statement.parameters, &path)?;

        let location = Location::new(path, statement.position);
        let definition = ClassDefinition::new(name.clone(), statement, location);
        let candidates = self.classes.entry(name).or_default();
        if let Some(index) = candidates
            .iter()
            .position(|existing| existing.conflicts_with(&definition))
        {
            return Ok(Some(&candidates[index]));
        }
        candidates.push(definition);
        Ok(None)
    }

    /// Register a `define` under `name`.
    pub fn define_type(
        &mut self,
        name: &str,
        statement: Arc<DefinedTypeStatement>,
        path: Arc<str>,
    ) -> Result<(), EvalError> {
        self.validate_parameters("defined type", &statement.parameters, &path)?;

        let name = name.trim_start_matches("::").to_lowercase();
        let location = Location::new(path, statement.position);
        if let Some(existing) = self.defined_types.get(&name) {
            return Err(EvalError::new(EvalErrorKind::DuplicateDefinedType {
                name,
                previous: existing.location.clone(),
            })
            .at(location));
        }
        self.defined_types.insert(
            name.clone(),
            DefinedType {
                name,
                statement,
                location,
            },
        );
        Ok(())
    }

    /// First pass over `statements`: register classes, defined types and
    /// functions, descending into class bodies. A nested class or defined
    /// type is named relative to the enclosing class.
    pub fn register_definitions(
        &mut self,
        statements: &[Stmt],
        path: &Arc<str>,
        enclosing: Option<&ClassName>,
    ) -> Result<(), EvalError> {
        for statement in statements {
            match statement {
                Stmt::Class(class) => {
                    let name = ClassName::new(&qualify(enclosing, class.name.as_str()));
                    let parent = class.parent.as_ref().map(|p| ClassName::new(p.as_str()));
                    let location = Location::new(path.clone(), class.position);

                    if let Some(existing) =
                        self.define_class(name.clone(), class.clone(), path.clone())?
                    {
                        return Err(EvalError::new(EvalErrorKind::ConflictingClassDefinition {
                            class: name.to_string(),
                            parent: parent.map(|p| p.to_string()).unwrap_or_default(),
                            existing_parent: existing
                                .parent()
                                .map(ToString::to_string)
                                .unwrap_or_default(),
                            existing: existing.location().clone(),
                        })
                        .at(location));
                    }
                    self.register_definitions(&class.body, path, Some(&name))?;
                }
                Stmt::DefinedType(define) => {
                    let name = qualify(enclosing, define.name.as_str());
                    self.define_type(&name, define.clone(), path.clone())?;
                }
                Stmt::Function(function) => {
                    let location = Location::new(path.clone(), function.position);
                    self.functions_mut().define(function.clone(), location)?;
                }
                Stmt::Expr(_) => {}
            }
        }
        Ok(())
    }

    pub fn is_class_defined(&self, name: &ClassName) -> bool {
        self.classes.get(name).is_some_and(|defs| !defs.is_empty())
    }

    /// Whether some definition of the class has been evaluated.
    pub fn is_class_declared(&self, name: &ClassName) -> bool {
        self.classes
            .get(name)
            .is_some_and(|defs| defs.iter().any(ClassDefinition::is_evaluated))
    }

    pub fn class_definitions(&self, name: &ClassName) -> &[ClassDefinition] {
        self.classes.get(name).map_or(&[], Vec::as_slice)
    }

    pub fn defined_type(&self, name: &str) -> Option<&DefinedType> {
        self.defined_types
            .get(name.trim_start_matches("::").to_lowercase().as_str())
    }

    /// Declare a class: add it to the catalog and evaluate its definitions.
    ///
    /// Idempotent; a class already in the catalog is returned unchanged,
    /// unless it is still waiting on its parent, which is a cycle.
    #[tracing::instrument(level = "debug", skip(self, location, arguments))]
    pub fn declare_class(
        &mut self,
        name: &ClassName,
        location: &Location,
        arguments: Option<&[(String, Value)]>,
    ) -> Result<ResourceId, EvalError> {
        if self.resolving.contains(name) {
            let start = self
                .evaluating
                .iter()
                .position(|pending| pending == name)
                .unwrap_or_default();
            let cycle: Vec<String> = self.evaluating[start..]
                .iter()
                .chain(std::iter::once(name))
                .map(ClassName::display_name)
                .collect();
            return Err(EvalError::new(EvalErrorKind::CyclicClassHierarchy {
                cycle: cycle.join(" -> "),
            })
            .at(location.clone()));
        }

        let key = name.resource_key();
        if let Some(id) = self.catalog.find_resource(&key) {
            return Ok(id);
        }

        let count = self.classes.get(name).map_or(0, Vec::len);
        if count == 0 {
            return Err(EvalError::new(EvalErrorKind::UndefinedClass {
                class: name.to_string(),
            })
            .at(location.clone()));
        }

        let Some(id) = self.catalog.add_resource(key, location.clone(), false) else {
            return Err(internal(format!("could not add {} to the catalog", name.display_name()))
                .at(location.clone()));
        };
        for index in 0..count {
            self.evaluate_class(name, index, arguments)?;
        }
        Ok(id)
    }

    /// Evaluate one definition of a class. No-op once evaluated.
    ///
    /// Errors from the class body are logged here, against the class, and
    /// returned as an already reported `ClassEvaluationFailed`.
    #[tracing::instrument(level = "debug", skip(self, arguments))]
    fn evaluate_class(
        &mut self,
        name: &ClassName,
        index: usize,
        arguments: Option<&[(String, Value)]>,
    ) -> Result<(), EvalError> {
        let Some(definition) = self.classes.get(name).and_then(|defs| defs.get(index)) else {
            return Err(internal(format!("{} has no definition {index}", name.display_name())));
        };
        let Some(statement) = definition.statement().cloned() else {
            return Ok(());
        };
        let origin = definition.location().clone();
        // Definitions never name different parents, and they share one scope,
        // so whichever runs first resolves the parent any of them names.
        let parent = self
            .class_definitions(name)
            .iter()
            .find_map(ClassDefinition::parent)
            .cloned();
        let display = name.display_name();
        let keywords = arguments.unwrap_or_default();

        self.evaluating.push(name.clone());
        let result = self.run_class(name, &statement, &origin, parent.as_ref(), keywords);
        self.evaluating.pop();
        match result {
            Ok(()) => {
                if let Some(definition) = self.classes.get_mut(name).and_then(|d| d.get_mut(index))
                {
                    definition.mark_evaluated();
                }
                Ok(())
            }
            Err(error) => {
                let guarantee = match error.guarantee() {
                    Some(guarantee) => guarantee,
                    None => {
                        let diagnostic = error
                            .clone()
                            .at(origin.clone())
                            .to_diagnostic()
                            .with_note(format!("while evaluating {display}"));
                        self.diagnostics.emit_error(diagnostic)
                    }
                };
                Err(EvalError::new(EvalErrorKind::ClassEvaluationFailed { class: display })
                    .at(origin)
                    .reported(guarantee))
            }
        }
    }

    fn run_class(
        &mut self,
        name: &ClassName,
        statement: &ClassStatement,
        origin: &Location,
        parent: Option<&ClassName>,
        keywords: &[(String, Value)],
    ) -> Result<(), EvalError> {
        let display = name.display_name();
        let executor = Executor::new(&display, &statement.parameters);
        executor
            .validate_keywords(keywords, true)
            .map_err(|error| error.at(origin.clone()))?;

        let parent_scope = match parent {
            None => self.top_scope(),
            Some(parent) => self.resolve_parent(name, parent, statement, origin)?,
        };

        let scope = self.add_scope(name.as_str(), display.clone(), Some(parent_scope));
        let title = Value::string(name.as_str());
        let name_value = keywords
            .iter()
            .find(|(keyword, _)| keyword == "name")
            .map_or_else(|| title.clone(), |(_, value)| value.clone());
        for (variable, value) in RESERVED_NAMES.into_iter().zip([title, name_value]) {
            if self.scope(scope).local(variable).is_none() {
                self.set_variable_in(scope, variable, value, origin.clone())?;
            }
        }

        let parameters: Vec<(String, Value)> = keywords
            .iter()
            .filter(|(keyword, _)| keyword != "name")
            .cloned()
            .collect();
        self.with_unit(origin.path.clone(), |context| {
            context.with_scope(scope, |scoped| {
                executor.bind(scoped, Bindings::Keywords(&parameters))?;
                scoped.evaluate_statements(&statement.body).map(|_| ())
            })
        })
    }

    /// Declare the parent of `name` and return its scope.
    fn resolve_parent(
        &mut self,
        name: &ClassName,
        parent: &ClassName,
        statement: &ClassStatement,
        origin: &Location,
    ) -> Result<ScopeId, EvalError> {
        let parent_location = statement
            .parent
            .as_ref()
            .map_or_else(|| origin.clone(), |p| Location::new(origin.path.clone(), p.position));
        let chain_start = self
            .resolving
            .iter()
            .chain(std::iter::once(name))
            .position(|pending| pending == parent);
        if let Some(start) = chain_start {
            let cycle: Vec<String> = self
                .resolving
                .iter()
                .chain([name, parent])
                .skip(start)
                .map(ClassName::display_name)
                .collect();
            return Err(EvalError::new(EvalErrorKind::CyclicClassHierarchy {
                cycle: cycle.join(" -> "),
            })
            .at(parent_location));
        }
        if !self.is_class_defined(parent) {
            return Err(EvalError::new(EvalErrorKind::UndefinedBaseClass {
                class: name.to_string(),
                parent: parent.to_string(),
            })
            .at(parent_location));
        }

        self.resolving.push(name.clone());
        let declared = with_stack(|| self.declare_class(parent, &parent_location, None));
        self.resolving.pop();
        declared?;

        self.find_scope(parent.as_str()).ok_or_else(|| {
            EvalError::new(EvalErrorKind::ClassEvaluationFailed {
                class: parent.display_name(),
            })
            .at(parent_location)
        })
    }
}
