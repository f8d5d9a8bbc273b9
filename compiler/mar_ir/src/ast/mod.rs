//! Syntax tree consumed by the evaluator.
//!
//! # Module Structure
//!
//! - `expr`: expressions (`Expr`, `ExprKind`), calls, lambdas, resources
//! - `operators`: binary and unary operators
//! - `stmt`: statements and the definition statements (class, define, function)
//! - `types`: syntactic type expressions (`Integer[1, 10]`, `Array[String]`)

mod expr;
mod operators;
mod stmt;
mod types;

pub use expr::{
    Attribute, Expr, ExprKind, FunctionCall, Ident, IfExpr, Lambda, Literal, ResourceBody,
    ResourceExpr,
};
pub use operators::{BinaryOp, UnaryOp};
pub use stmt::{
    ClassStatement, DefinedTypeStatement, FunctionStatement, Parameter, Stmt, SyntaxTree,
};
pub use types::{TypeArgument, TypeExpr};
