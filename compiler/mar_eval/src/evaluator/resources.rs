//! Resource expressions.
//!
//! `class { 'x': }` declares a class, a defined type's resource evaluates
//! the define body, and anything else is a native resource that is only
//! recorded in the catalog.

use mar_ir::{Expr, Location, Position, ResourceExpr};
use mar_types::Value;

use crate::catalog::{ResourceId, ResourceKey};
use crate::class_definition::ClassName;
use crate::context::{DefinedType, EvaluationContext};
use crate::errors::{evaluation_failure, internal, EvalError, EvalErrorKind, EvalResult};
use crate::executor::{Bindings, Executor};

impl EvaluationContext<'_> {
    /// Evaluate a resource expression to its reference, or to an array of
    /// references when it declares more than one resource.
    pub(crate) fn evaluate_resource(
        &mut self,
        resource: &ResourceExpr,
        position: Position,
    ) -> EvalResult {
        let type_name = resource
            .type_name
            .as_str()
            .trim_start_matches("::")
            .to_lowercase();
        let mut references = Vec::new();

        for body in &resource.bodies {
            let location = self.location(if body.title.position.is_dummy() {
                position
            } else {
                body.title.position
            });
            let titles = self.evaluate_titles(&body.title, &location)?;
            let mut attributes = Vec::with_capacity(body.attributes.len());
            for attribute in &body.attributes {
                let value = self.evaluate_expr(&attribute.value)?;
                attributes.push((attribute.name.as_str().to_string(), value));
            }

            for title in titles {
                let reference = if type_name == "class" {
                    self.declare_class_resource(&title, &attributes, &location)?
                } else if let Some(defined) = self.defined_type(&type_name).cloned() {
                    self.declare_defined_resource(&defined, &title, &attributes, &location)?
                } else {
                    let key = ResourceKey::new(type_name.as_str(), title);
                    let id = self.add_catalog_resource(key.clone(), &location, resource.exported)?;
                    self.set_attributes(id, &attributes);
                    key.to_string()
                };
                references.push(Value::string(reference));
            }
        }

        if references.len() == 1 {
            if let Some(reference) = references.pop() {
                return Ok(reference);
            }
        }
        Ok(Value::array(references))
    }

    /// A title is a string or an array of strings.
    fn evaluate_titles(
        &mut self,
        title: &Expr,
        location: &Location,
    ) -> Result<Vec<String>, EvalError> {
        let value = self.evaluate_expr(title)?;
        let invalid = |value: &Value| {
            evaluation_failure(format!(
                "resource title must be a String or an Array of String, not {}.",
                value.type_name()
            ))
            .at(location.clone())
        };
        match &value {
            Value::String(s) => Ok(vec![s.to_string()]),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(|| invalid(item)))
                .collect(),
            other => Err(invalid(other)),
        }
    }

    fn add_catalog_resource(
        &mut self,
        key: ResourceKey,
        location: &Location,
        exported: bool,
    ) -> Result<ResourceId, EvalError> {
        if let Some(previous) = self
            .catalog()
            .find_resource(&key)
            .and_then(|id| self.catalog().resource(id))
        {
            return Err(EvalError::new(EvalErrorKind::DuplicateResource {
                resource: key.to_string(),
                previous: previous.location.clone(),
            })
            .at(location.clone()));
        }
        let display = key.to_string();
        self.catalog_mut()
            .add_resource(key, location.clone(), exported)
            .ok_or_else(|| {
                internal(format!("could not add {display} to the catalog"))
                    .at(location.clone())
            })
    }

    /// Record attributes; `undef` leaves an attribute unset.
    fn set_attributes(&mut self, id: ResourceId, attributes: &[(String, Value)]) {
        for (name, value) in attributes {
            if !value.is_undef() {
                self.catalog_mut().set_parameter(id, name, value.clone());
            }
        }
    }

    fn declare_class_resource(
        &mut self,
        title: &str,
        attributes: &[(String, Value)],
        location: &Location,
    ) -> Result<String, EvalError> {
        let name = ClassName::new(title);
        let key = name.resource_key();
        if !attributes.is_empty() {
            if let Some(previous) = self
                .catalog()
                .find_resource(&key)
                .and_then(|id| self.catalog().resource(id))
            {
                return Err(EvalError::new(EvalErrorKind::DuplicateResource {
                    resource: name.display_name(),
                    previous: previous.location.clone(),
                })
                .at(location.clone()));
            }
        }
        let id = self.declare_class(&name, location, Some(attributes))?;
        self.set_attributes(id, attributes);
        Ok(name.display_name())
    }

    fn declare_defined_resource(
        &mut self,
        defined: &DefinedType,
        title: &str,
        attributes: &[(String, Value)],
        location: &Location,
    ) -> Result<String, EvalError> {
        let key = ResourceKey::new(defined.name.as_str(), title);
        let display = key.to_string();
        let statement = defined.statement.clone();

        let executor = Executor::new(&display, &statement.parameters);
        executor
            .validate_keywords(attributes, true)
            .map_err(|error| error.at(location.clone()))?;
        let id = self.add_catalog_resource(key, location, false)?;
        self.set_attributes(id, attributes);

        let title_value = Value::string(title);
        let name_value = attributes
            .iter()
            .find(|(keyword, _)| keyword == "name")
            .map_or_else(|| title_value.clone(), |(_, value)| value.clone());
        let parameters: Vec<(String, Value)> = attributes
            .iter()
            .filter(|(keyword, _)| keyword != "name")
            .cloned()
            .collect();
        let origin = defined.location.clone();
        let top = self.top_scope();

        self.with_unit(origin.path.clone(), |context| {
            context.with_ephemeral_scope(&display, top, |scoped| {
                scoped.set_variable("title", title_value, origin.clone())?;
                scoped.set_variable("name", name_value, origin.clone())?;
                executor.bind(scoped, Bindings::Keywords(&parameters))?;
                scoped.evaluate_statements(&statement.body)
            })
        })?;
        Ok(display)
    }
}
