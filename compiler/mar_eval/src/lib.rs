//! Marionette Eval - dispatch and class resolution for the Marionette compiler.
//!
//! This crate evaluates a parsed manifest into a catalog of resources.
//!
//! # Architecture
//!
//! The evaluator uses:
//! - `Descriptor`: ordered (signature, callback) candidates for every operator
//!   and function, resolved by arity, then block, then argument types
//! - `CallContext`: evaluated arguments plus a lazily evaluated block
//! - `ScopeArena`: every scope of a compilation, linked to parents by handle
//! - `ClassDefinition`: a class statement awaiting its single evaluation
//! - `EvaluationContext`: scope stack, class table and the define/declare
//!   protocol against a `Catalog`
//! - `Executor`: parameter binding for classes, defined types, functions and
//!   lambdas
//!
//! # Errors
//!
//! Every failure is an `EvalError`. Class evaluation is the one boundary that
//! absorbs errors: it reports them and returns `ClassEvaluationFailed`, so the
//! caller sees a single, already reported failure.

mod catalog;
mod class_definition;
mod context;
pub mod dispatch;
pub mod errors;
mod evaluator;
mod executor;
mod functions;
mod operators;
mod scope;
mod settings;
mod stack;

pub use catalog::{Catalog, MemoryCatalog, Resource, ResourceId, ResourceKey};
pub use class_definition::{ClassDefinition, ClassName};
pub use context::{DefinedType, EvaluationContext, ScopedContext};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use executor::{Bindings, Executor};
pub use functions::{FunctionTable, SourceFunction};
pub use operators::OperatorTable;
pub use scope::{Scope, ScopeArena, ScopeId, Variable};
pub use settings::EvalSettings;

#[cfg(test)]
mod tests;
