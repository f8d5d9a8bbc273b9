//! Marionette IR - syntax tree and source position types.
//!
//! This crate contains the data the evaluator consumes:
//! - `Position` and `Location` for diagnostics
//! - `SyntaxTree`, the immutable parsed form of one manifest
//! - AST nodes (statements, expressions, parameters, lambdas, type expressions)
//!
//! # Design Philosophy
//!
//! - **Immutable after parsing**: the evaluator only reads the tree.
//! - **Shared definitions**: class, defined-type and function statements are
//!   held in `Arc` so deferred definitions can outlive the walk that found them.
//! - **Positions everywhere**: every node that can fail carries a `Position`.

pub mod ast;
mod position;

pub use ast::{
    Attribute, BinaryOp, ClassStatement, DefinedTypeStatement, Expr, ExprKind, FunctionCall,
    FunctionStatement, Ident, IfExpr, Lambda, Literal, Parameter, ResourceBody, ResourceExpr, Stmt,
    SyntaxTree, TypeArgument, TypeExpr, UnaryOp,
};
pub use position::{Location, Position};
