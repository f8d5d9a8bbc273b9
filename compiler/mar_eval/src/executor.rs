//! Parameter binding.
//!
//! An [`Executor`] binds a parameter list against positional arguments
//! (functions, lambdas) or keyword arguments (classes, defined types) into
//! the *current* scope. Callers enter the body scope first, so defaults are
//! evaluated with earlier parameters already visible.

use mar_ir::Parameter;
use mar_types::{Type, Value};

use crate::context::EvaluationContext;
use crate::errors::{EvalError, EvalErrorKind};

/// Arguments to bind.
#[derive(Copy, Clone, Debug)]
pub enum Bindings<'v> {
    Positional(&'v [Value]),
    Keywords(&'v [(String, Value)]),
}

/// Binds one parameter list.
pub struct Executor<'p> {
    /// Used in messages, e.g. `Class[Apache]` or `function 'greet'`.
    owner: &'p str,
    parameters: &'p [Parameter],
}

impl<'p> Executor<'p> {
    pub fn new(owner: &'p str, parameters: &'p [Parameter]) -> Self {
        Executor { owner, parameters }
    }

    /// Reject keywords that name no parameter. `name` is accepted as an
    /// override when `allow_name` is set.
    pub fn validate_keywords(
        &self,
        keywords: &[(String, Value)],
        allow_name: bool,
    ) -> Result<(), EvalError> {
        for (keyword, _) in keywords {
            if allow_name && keyword == "name" {
                continue;
            }
            if !self.parameters.iter().any(|p| p.name() == keyword) {
                return Err(EvalError::new(EvalErrorKind::UnknownParameter {
                    owner: self.owner.to_string(),
                    parameter: keyword.clone(),
                }));
            }
        }
        Ok(())
    }

    /// Bind every parameter in declaration order.
    pub fn bind(
        &self,
        context: &mut EvaluationContext<'_>,
        bindings: Bindings<'_>,
    ) -> Result<(), EvalError> {
        for (index, parameter) in self.parameters.iter().enumerate() {
            let origin = context.location(parameter.name.position);
            let ty = match &parameter.type_expr {
                Some(type_expr) => Some(context.resolve_type(type_expr)?),
                None => None,
            };

            let supplied = match bindings {
                Bindings::Positional(values) if parameter.captures_rest => Some(Value::array(
                    values.get(index..).map(<[Value]>::to_vec).unwrap_or_default(),
                )),
                Bindings::Positional(values) => values.get(index).cloned(),
                // An explicit undef selects the default.
                Bindings::Keywords(keywords) => keywords
                    .iter()
                    .find(|(keyword, _)| keyword == parameter.name())
                    .map(|(_, value)| value.clone())
                    .filter(|value| !(value.is_undef() && parameter.default.is_some())),
            };

            let value = match (supplied, &parameter.default) {
                (Some(value), _) => value,
                (None, Some(default)) => context.evaluate_expr(default)?,
                (None, None) => match &ty {
                    Some(ty) if ty.is_instance(&Value::Undef) => Value::Undef,
                    _ => {
                        return Err(EvalError::new(EvalErrorKind::MissingParameter {
                            owner: self.owner.to_string(),
                            parameter: parameter.name().to_string(),
                        })
                        .at(origin));
                    }
                },
            };

            if let Some(ty) = &ty {
                self.check_type(parameter, ty, &value)
                    .map_err(|error| error.at(origin.clone()))?;
            }
            context.set_variable(parameter.name(), value, origin)?;
        }
        Ok(())
    }

    fn check_type(&self, parameter: &Parameter, ty: &Type, value: &Value) -> Result<(), EvalError> {
        let rejected = if parameter.captures_rest {
            value
                .as_array()
                .and_then(|items| items.iter().find(|item| !ty.is_instance(item)))
        } else if ty.is_instance(value) {
            None
        } else {
            Some(value)
        };
        match rejected {
            None => Ok(()),
            Some(value) => Err(EvalError::new(EvalErrorKind::ParameterTypeMismatch {
                owner: self.owner.to_string(),
                parameter: parameter.name().to_string(),
                expected: ty.to_string(),
                actual: value.type_name().to_string(),
            })),
        }
    }
}

#[cfg(test)]
mod tests;
