//! Expression nodes.

use super::{BinaryOp, Parameter, Stmt, TypeExpr, UnaryOp};
use crate::Position;

/// A name together with the position it was written at.
#[derive(Clone, PartialEq, Debug)]
pub struct Ident {
    pub value: String,
    pub position: Position,
}

impl Ident {
    pub fn new(value: impl Into<String>, position: Position) -> Self {
        Ident {
            value: value.into(),
            position,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

/// Literal values as written in source.
#[derive(Clone, PartialEq, Debug)]
pub enum Literal {
    Undef,
    Default,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Regular expression source, without the surrounding slashes.
    Regex(String),
}

/// An expression with its source position.
#[derive(Clone, PartialEq, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub position: Position,
}

/// Expression variants.
#[derive(Clone, PartialEq, Debug)]
pub enum ExprKind {
    Literal(Literal),
    /// `$name`, `$cls::name` or `$::name`.
    Variable(String),
    /// Double-quoted string with interpolated segments.
    Interpolated(Vec<Expr>),
    Array(Vec<Expr>),
    Hash(Vec<(Expr, Expr)>),
    /// Type literal such as `Integer[1, 10]`.
    Type(TypeExpr),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `$name = value`
    Assignment {
        name: String,
        value: Box<Expr>,
    },
    If(Box<IfExpr>),
    Call(Box<FunctionCall>),
    Resource(Box<ResourceExpr>),
}

/// `if cond { ... } else { ... }`
#[derive(Clone, PartialEq, Debug)]
pub struct IfExpr {
    pub condition: Expr,
    pub then_body: Vec<Stmt>,
    pub else_body: Option<Vec<Stmt>>,
}

/// A function call, optionally with an attached lambda.
#[derive(Clone, PartialEq, Debug)]
pub struct FunctionCall {
    pub name: Ident,
    pub arguments: Vec<Expr>,
    pub lambda: Option<Lambda>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, arguments: Vec<Expr>) -> Self {
        FunctionCall {
            name: Ident::new(name, Position::DUMMY),
            arguments,
            lambda: None,
        }
    }

    #[must_use]
    pub fn with_lambda(mut self, lambda: Lambda) -> Self {
        self.lambda = Some(lambda);
        self
    }
}

/// `|$a, $b| { body }`
#[derive(Clone, PartialEq, Debug)]
pub struct Lambda {
    pub parameters: Vec<Parameter>,
    pub body: Vec<Stmt>,
    pub position: Position,
}

impl Lambda {
    pub fn new(parameters: Vec<Parameter>, body: Vec<Stmt>) -> Self {
        Lambda {
            parameters,
            body,
            position: Position::DUMMY,
        }
    }

    #[must_use]
    pub fn at(mut self, line: u32) -> Self {
        self.position = Position::line(line);
        self
    }
}

/// `type { title: attr => value, ... }`
#[derive(Clone, PartialEq, Debug)]
pub struct ResourceExpr {
    pub type_name: Ident,
    pub bodies: Vec<ResourceBody>,
    /// Declared with `@@`.
    pub exported: bool,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ResourceBody {
    pub title: Expr,
    pub attributes: Vec<Attribute>,
}

/// `name => value`
#[derive(Clone, PartialEq, Debug)]
pub struct Attribute {
    pub name: Ident,
    pub value: Expr,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: Expr) -> Self {
        let position = value.position;
        Attribute {
            name: Ident::new(name, position),
            value,
        }
    }
}

// Constructors used by the parser front-end and by tests.
impl Expr {
    pub fn new(kind: ExprKind, position: Position) -> Self {
        Expr { kind, position }
    }

    fn from_kind(kind: ExprKind) -> Self {
        Expr::new(kind, Position::DUMMY)
    }

    /// Set the line this expression was written on.
    #[must_use]
    pub fn at(mut self, line: u32) -> Self {
        self.position = Position::line(line);
        self
    }

    pub fn literal(literal: Literal) -> Self {
        Self::from_kind(ExprKind::Literal(literal))
    }

    pub fn undef() -> Self {
        Self::literal(Literal::Undef)
    }

    pub fn boolean(value: bool) -> Self {
        Self::literal(Literal::Boolean(value))
    }

    pub fn integer(value: i64) -> Self {
        Self::literal(Literal::Integer(value))
    }

    pub fn float(value: f64) -> Self {
        Self::literal(Literal::Float(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::literal(Literal::String(value.into()))
    }

    pub fn regex(source: impl Into<String>) -> Self {
        Self::literal(Literal::Regex(source.into()))
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::from_kind(ExprKind::Variable(name.into()))
    }

    pub fn interpolated(parts: Vec<Expr>) -> Self {
        Self::from_kind(ExprKind::Interpolated(parts))
    }

    pub fn array(elements: Vec<Expr>) -> Self {
        Self::from_kind(ExprKind::Array(elements))
    }

    pub fn hash(entries: Vec<(Expr, Expr)>) -> Self {
        Self::from_kind(ExprKind::Hash(entries))
    }

    pub fn type_literal(ty: TypeExpr) -> Self {
        Self::from_kind(ExprKind::Type(ty))
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::from_kind(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Self::from_kind(ExprKind::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    pub fn assign(name: impl Into<String>, value: Expr) -> Self {
        Self::from_kind(ExprKind::Assignment {
            name: name.into(),
            value: Box::new(value),
        })
    }

    pub fn if_else(condition: Expr, then_body: Vec<Stmt>, else_body: Option<Vec<Stmt>>) -> Self {
        Self::from_kind(ExprKind::If(Box::new(IfExpr {
            condition,
            then_body,
            else_body,
        })))
    }

    pub fn call(name: impl Into<String>, arguments: Vec<Expr>) -> Self {
        Self::function_call(FunctionCall::new(name, arguments))
    }

    pub fn function_call(call: FunctionCall) -> Self {
        Self::from_kind(ExprKind::Call(Box::new(call)))
    }

    /// A resource expression with a single body.
    pub fn resource(type_name: impl Into<String>, title: Expr, attributes: Vec<Attribute>) -> Self {
        Self::from_kind(ExprKind::Resource(Box::new(ResourceExpr {
            type_name: Ident::new(type_name, Position::DUMMY),
            bodies: vec![ResourceBody { title, attributes }],
            exported: false,
        })))
    }
}
