//! Statement and expression evaluation.
//!
//! Every operator and function call is evaluated through a dispatch
//! [`Descriptor`]: operands are evaluated left to right into a
//! [`CallContext`], and the descriptor picks the implementation. The right
//! operand of `and`/`or` is not evaluated here; it becomes a deferred block
//! the callback may or may not yield to.

mod resources;
mod types;

use std::sync::Arc;

use mar_ir::{Expr, ExprKind, FunctionCall, FunctionStatement, Literal, Location, Position, Stmt};
use mar_types::{HashValue, Value};
use regex::Regex;

use crate::context::EvaluationContext;
use crate::dispatch::{Argument, Arguments, Block, CallContext, Descriptor};
use crate::errors::{evaluation_failure, internal, invalid_regex, EvalError, EvalErrorKind, EvalResult};
use crate::executor::{Bindings, Executor};
use crate::stack::with_stack;

impl EvaluationContext<'_> {
    /// Evaluate `statements` in order. The value is that of the last one.
    pub fn evaluate_statements(&mut self, statements: &[Stmt]) -> EvalResult {
        let mut last = Value::Undef;
        for statement in statements {
            last = self.evaluate_statement(statement)?;
        }
        Ok(last)
    }

    /// Definitions are registered before evaluation starts, so they
    /// evaluate to `undef`.
    pub fn evaluate_statement(&mut self, statement: &Stmt) -> EvalResult {
        match statement {
            Stmt::Expr(expr) => self.evaluate_expr(expr),
            Stmt::Class(_) | Stmt::DefinedType(_) | Stmt::Function(_) => Ok(Value::Undef),
        }
    }

    pub fn evaluate_expr(&mut self, expr: &Expr) -> EvalResult {
        with_stack(|| self.evaluate_expr_inner(expr))
    }

    fn evaluate_expr_inner(&mut self, expr: &Expr) -> EvalResult {
        match &expr.kind {
            ExprKind::Literal(literal) => self.evaluate_literal(literal, expr.position),
            ExprKind::Variable(name) => {
                let location = self.location(expr.position);
                self.lookup_variable(name, &location)
            }
            ExprKind::Interpolated(parts) => {
                let mut result = String::new();
                for part in parts {
                    let value = self.evaluate_expr(part)?;
                    result.push_str(&value.to_string());
                }
                Ok(Value::string(result))
            }
            ExprKind::Array(elements) => {
                let items = elements
                    .iter()
                    .map(|element| self.evaluate_expr(element))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::array(items))
            }
            ExprKind::Hash(entries) => {
                let mut hash = HashValue::new();
                for (key, value) in entries {
                    let key = self.evaluate_expr(key)?;
                    let value = self.evaluate_expr(value)?;
                    hash.insert(key, value);
                }
                Ok(Value::hash(hash))
            }
            ExprKind::Type(type_expr) => Ok(Value::type_value(self.resolve_type(type_expr)?)),
            ExprKind::Binary { op, left, right } => {
                let location = self.location(expr.position);
                let Some(descriptor) = self.operators().binary(*op) else {
                    return Err(internal(format!("no descriptor for operator '{op}'")).at(location));
                };
                let mut arguments = Arguments::new();
                arguments.push(Argument::new(self.evaluate_expr(left)?, left.position));
                let block = if op.is_short_circuit() {
                    Some(Block::Deferred(right))
                } else {
                    arguments.push(Argument::new(self.evaluate_expr(right)?, right.position));
                    None
                };
                self.dispatch(&descriptor, op.as_symbol(), location, arguments, block)
            }
            ExprKind::Unary { op, operand } => {
                let location = self.location(expr.position);
                let Some(descriptor) = self.operators().unary(*op) else {
                    return Err(internal(format!("no descriptor for operator '{op}'")).at(location));
                };
                let mut arguments = Arguments::new();
                arguments.push(Argument::new(self.evaluate_expr(operand)?, operand.position));
                self.dispatch(&descriptor, op.as_symbol(), location, arguments, None)
            }
            ExprKind::Assignment { name, value } => {
                let location = self.location(expr.position);
                if name == "title" || name == "name" {
                    return Err(EvalError::new(EvalErrorKind::ReservedVariableName {
                        name: name.clone(),
                    })
                    .at(location));
                }
                if name.contains("::") {
                    return Err(evaluation_failure(format!(
                        "cannot assign to ${name}: qualified variables are read-only."
                    ))
                    .at(location));
                }
                let value = self.evaluate_expr(value)?;
                self.set_variable(name, value.clone(), location)?;
                Ok(value)
            }
            ExprKind::If(if_expr) => {
                if self.evaluate_expr(&if_expr.condition)?.is_truthy() {
                    self.evaluate_statements(&if_expr.then_body)
                } else {
                    match &if_expr.else_body {
                        Some(body) => self.evaluate_statements(body),
                        None => Ok(Value::Undef),
                    }
                }
            }
            ExprKind::Call(call) => self.evaluate_call(call, expr.position),
            ExprKind::Resource(resource) => self.evaluate_resource(resource, expr.position),
        }
    }

    fn evaluate_literal(&self, literal: &Literal, position: Position) -> EvalResult {
        let value = match literal {
            Literal::Undef => Value::Undef,
            Literal::Default => Value::Default,
            Literal::Boolean(b) => Value::Boolean(*b),
            Literal::Integer(n) => Value::Integer(*n),
            Literal::Float(f) => Value::Float(*f),
            Literal::String(s) => Value::string(s.as_str()),
            Literal::Regex(source) => match Regex::new(source) {
                Ok(regex) => Value::regex(regex),
                Err(error) => {
                    return Err(invalid_regex(source, &error).at(self.location(position)));
                }
            },
        };
        Ok(value)
    }

    fn evaluate_call(&mut self, call: &FunctionCall, position: Position) -> EvalResult {
        let position = if call.name.position.is_dummy() {
            position
        } else {
            call.name.position
        };
        let location = self.location(position);
        let name = call.name.as_str();
        let Some(descriptor) = self.function_descriptor(name)? else {
            return Err(EvalError::new(EvalErrorKind::UndefinedFunction {
                name: name.to_string(),
            })
            .at(location));
        };

        let mut arguments = Arguments::new();
        for argument in &call.arguments {
            arguments.push(Argument::new(self.evaluate_expr(argument)?, argument.position));
        }
        let block = call.lambda.as_ref().map(Block::Lambda);
        self.dispatch(&descriptor, name, location, arguments, block)
    }

    /// Build a call context and dispatch it.
    fn dispatch(
        &mut self,
        descriptor: &Descriptor,
        name: &str,
        location: Location,
        arguments: Arguments,
        block: Option<Block<'_>>,
    ) -> EvalResult {
        if !descriptor.is_dispatchable() {
            return Err(internal(format!("'{name}' has no candidates")).at(location));
        }
        let mut call = CallContext::new(self, name, location, arguments, block);
        descriptor.dispatch(&mut call)
    }

    /// Descriptor for the function `name`, building and caching it for
    /// source-defined functions.
    pub fn function_descriptor(&mut self, name: &str) -> Result<Option<Arc<Descriptor>>, EvalError> {
        if let Some(descriptor) = self.functions().builtin_descriptor(name) {
            return Ok(Some(descriptor));
        }
        let Some(function) = self.functions().source(name) else {
            return Ok(None);
        };
        if let Some(descriptor) = function.descriptor() {
            return Ok(Some(descriptor));
        }

        let statement = function.statement().clone();
        let path = function.location().path.clone();
        let signature = self.with_unit(path.clone(), |context| {
            context.function_signature(&statement)
        })?;
        let callee = statement.clone();
        let descriptor = Arc::new(Descriptor::new(name).with(
            signature,
            move |call: &mut CallContext<'_, '_>| {
                let values = call.values();
                call.context().call_function(&callee, &path, values)
            },
        ));
        self.functions_mut().cache(name, descriptor.clone());
        Ok(Some(descriptor))
    }

    /// Invoke a source-defined function in a fresh scope under the top scope.
    pub(crate) fn call_function(
        &mut self,
        statement: &FunctionStatement,
        path: &Arc<str>,
        values: Vec<Value>,
    ) -> EvalResult {
        let owner = format!("function '{}'", statement.name.as_str());
        let top = self.top_scope();
        self.with_unit(path.clone(), |context| {
            context.with_ephemeral_scope(&owner, top, |scoped| {
                Executor::new(&owner, &statement.parameters)
                    .bind(scoped, Bindings::Positional(&values))?;
                scoped.evaluate_statements(&statement.body)
            })
        })
    }

    /// Evaluate a block yielded to by a dispatch callback.
    ///
    /// A lambda runs in a fresh scope chained to the scope it was written
    /// in; a deferred operand is evaluated in place.
    pub(crate) fn call_block(&mut self, block: Block<'_>, arguments: Vec<Value>) -> EvalResult {
        match block {
            Block::Deferred(expr) => self.evaluate_expr(expr),
            Block::Lambda(lambda) => {
                let parent = self.current_scope();
                self.with_ephemeral_scope("lambda", parent, |scoped| {
                    Executor::new("lambda", &lambda.parameters)
                        .bind(scoped, Bindings::Positional(&arguments))?;
                    scoped.evaluate_statements(&lambda.body)
                })
            }
        }
    }
}
