//! Resolution of type expressions into runtime types.

use mar_ir::{FunctionStatement, TypeArgument, TypeExpr};
use mar_types::Type;
use regex::Regex;

use crate::context::EvaluationContext;
use crate::dispatch::Signature;
use crate::errors::{invalid_regex, EvalError, EvalErrorKind};

impl EvaluationContext<'_> {
    /// Resolve `Integer[1, 10]`, `Array[String]` and friends.
    pub fn resolve_type(&self, expr: &TypeExpr) -> Result<Type, EvalError> {
        let unknown = || {
            EvalError::new(EvalErrorKind::UnknownType {
                name: expr.to_string(),
            })
            .at(self.location(expr.position))
        };
        if expr.arguments.is_empty() {
            return Type::from_name(&expr.name).ok_or_else(unknown);
        }

        let ty = match expr.name.as_str() {
            "Integer" => {
                let mut bounds = [None, None];
                if expr.arguments.len() > 2 {
                    return Err(unknown());
                }
                for (bound, argument) in bounds.iter_mut().zip(&expr.arguments) {
                    *bound = match argument {
                        TypeArgument::Integer(n) => Some(*n),
                        TypeArgument::Default => None,
                        _ => return Err(unknown()),
                    };
                }
                let [from, to] = bounds;
                Type::Integer { from, to }
            }
            "Pattern" => {
                let mut patterns = Vec::with_capacity(expr.arguments.len());
                for argument in &expr.arguments {
                    let (TypeArgument::Regex(source) | TypeArgument::String(source)) = argument
                    else {
                        return Err(unknown());
                    };
                    let regex = Regex::new(source)
                        .map_err(|error| invalid_regex(source, &error).at(self.location(expr.position)))?;
                    patterns.push(regex);
                }
                Type::Pattern(patterns)
            }
            "Enum" => {
                let names = expr
                    .arguments
                    .iter()
                    .map(|argument| match argument {
                        TypeArgument::String(name) => Ok(name.clone()),
                        _ => Err(unknown()),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Type::Enum(names)
            }
            "Variant" => Type::Variant(self.type_arguments(expr)?),
            name => {
                let mut types = self.type_arguments(expr)?.into_iter();
                match (name, types.next(), types.next(), types.next()) {
                    ("Array", Some(element), None, None) => Type::Array(Box::new(element)),
                    ("Hash", Some(key), Some(value), None) => {
                        Type::Hash(Box::new(key), Box::new(value))
                    }
                    ("Optional", Some(inner), None, None) => Type::Optional(Box::new(inner)),
                    ("Type", Some(bound), None, None) => Type::Type(Some(Box::new(bound))),
                    _ => return Err(unknown()),
                }
            }
        };
        Ok(ty)
    }

    /// Arguments of `expr` that must all be types.
    fn type_arguments(&self, expr: &TypeExpr) -> Result<Vec<Type>, EvalError> {
        expr.arguments
            .iter()
            .map(|argument| match argument {
                TypeArgument::Type(ty) => self.resolve_type(ty),
                _ => Err(EvalError::new(EvalErrorKind::UnknownType {
                    name: expr.to_string(),
                })
                .at(self.location(expr.position))),
            })
            .collect()
    }

    /// Dispatch signature of a source-defined function: one slot per
    /// parameter, optional from the first default, and a rest slot for a
    /// trailing `*$rest`.
    pub(crate) fn function_signature(
        &self,
        statement: &FunctionStatement,
    ) -> Result<Signature, EvalError> {
        let mut slots = Vec::with_capacity(statement.parameters.len());
        let mut rest = None;
        let mut first_optional = None;
        for (index, parameter) in statement.parameters.iter().enumerate() {
            let ty = match &parameter.type_expr {
                Some(type_expr) => self.resolve_type(type_expr)?,
                None => Type::Any,
            };
            if parameter.captures_rest {
                rest = Some(ty);
                break;
            }
            if parameter.default.is_some() && first_optional.is_none() {
                first_optional = Some(index);
            }
            slots.push(ty);
        }

        let required = first_optional.unwrap_or(slots.len());
        let signature = Signature::new(slots).optional_from(required);
        Ok(match rest {
            Some(ty) => signature.rest(ty),
            None => signature,
        })
    }
}
