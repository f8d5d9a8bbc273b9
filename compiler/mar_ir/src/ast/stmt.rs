//! Statements and definition statements.

use std::sync::Arc;

use super::{Expr, Ident, TypeExpr};
use crate::Position;

/// A parsed manifest.
#[derive(Clone, PartialEq, Debug)]
pub struct SyntaxTree {
    /// Path of the manifest the tree was parsed from.
    pub path: Arc<str>,
    pub statements: Vec<Stmt>,
}

impl SyntaxTree {
    pub fn new(path: impl Into<Arc<str>>, statements: Vec<Stmt>) -> Self {
        SyntaxTree {
            path: path.into(),
            statements,
        }
    }
}

/// Statement variants.
///
/// Definition statements are reference counted: a class definition keeps its
/// statement alive until the class body has been evaluated.
#[derive(Clone, PartialEq, Debug)]
pub enum Stmt {
    Expr(Expr),
    Class(Arc<ClassStatement>),
    DefinedType(Arc<DefinedTypeStatement>),
    Function(Arc<FunctionStatement>),
}

impl Stmt {
    pub fn position(&self) -> Position {
        match self {
            Stmt::Expr(expr) => expr.position,
            Stmt::Class(class) => class.position,
            Stmt::DefinedType(define) => define.position,
            Stmt::Function(function) => function.position,
        }
    }

    pub fn class(statement: ClassStatement) -> Self {
        Stmt::Class(Arc::new(statement))
    }

    pub fn defined_type(statement: DefinedTypeStatement) -> Self {
        Stmt::DefinedType(Arc::new(statement))
    }

    pub fn function(statement: FunctionStatement) -> Self {
        Stmt::Function(Arc::new(statement))
    }
}

impl From<Expr> for Stmt {
    fn from(expr: Expr) -> Self {
        Stmt::Expr(expr)
    }
}

/// A parameter of a class, defined type, function or lambda.
#[derive(Clone, PartialEq, Debug)]
pub struct Parameter {
    pub name: Ident,
    pub type_expr: Option<TypeExpr>,
    pub default: Option<Expr>,
    /// `*$rest`: captures all remaining arguments.
    pub captures_rest: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Parameter {
            name: Ident::new(name, Position::DUMMY),
            type_expr: None,
            default: None,
            captures_rest: false,
        }
    }

    #[must_use]
    pub fn typed(mut self, type_expr: TypeExpr) -> Self {
        self.type_expr = Some(type_expr);
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: Expr) -> Self {
        self.default = Some(default);
        self
    }

    #[must_use]
    pub fn rest(mut self) -> Self {
        self.captures_rest = true;
        self
    }

    #[must_use]
    pub fn at(mut self, line: u32) -> Self {
        self.name.position = Position::line(line);
        self
    }

    pub fn name(&self) -> &str {
        &self.name.value
    }
}

/// `class name(params) inherits parent { body }`
#[derive(Clone, PartialEq, Debug)]
pub struct ClassStatement {
    pub name: Ident,
    pub parameters: Vec<Parameter>,
    pub parent: Option<Ident>,
    pub body: Vec<Stmt>,
    pub position: Position,
}

impl ClassStatement {
    pub fn new(name: impl Into<String>) -> Self {
        ClassStatement {
            name: Ident::new(name, Position::DUMMY),
            parameters: Vec::new(),
            parent: None,
            body: Vec::new(),
            position: Position::DUMMY,
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(Ident::new(parent, self.position));
        self
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Vec<Stmt>) -> Self {
        self.body = body;
        self
    }

    /// Set the line of the statement, its name and its `inherits` clause.
    #[must_use]
    pub fn at(mut self, line: u32) -> Self {
        self.position = Position::line(line);
        self.name.position = self.position;
        if let Some(parent) = &mut self.parent {
            parent.position = Position::line(line);
        }
        self
    }
}

/// `define name(params) { body }`
#[derive(Clone, PartialEq, Debug)]
pub struct DefinedTypeStatement {
    pub name: Ident,
    pub parameters: Vec<Parameter>,
    pub body: Vec<Stmt>,
    pub position: Position,
}

impl DefinedTypeStatement {
    pub fn new(name: impl Into<String>, parameters: Vec<Parameter>, body: Vec<Stmt>) -> Self {
        DefinedTypeStatement {
            name: Ident::new(name, Position::DUMMY),
            parameters,
            body,
            position: Position::DUMMY,
        }
    }

    #[must_use]
    pub fn at(mut self, line: u32) -> Self {
        self.position = Position::line(line);
        self.name.position = self.position;
        self
    }
}

/// `function name(params) { body }`
#[derive(Clone, PartialEq, Debug)]
pub struct FunctionStatement {
    pub name: Ident,
    pub parameters: Vec<Parameter>,
    pub body: Vec<Stmt>,
    pub position: Position,
}

impl FunctionStatement {
    pub fn new(name: impl Into<String>, parameters: Vec<Parameter>, body: Vec<Stmt>) -> Self {
        FunctionStatement {
            name: Ident::new(name, Position::DUMMY),
            parameters,
            body,
            position: Position::DUMMY,
        }
    }

    #[must_use]
    pub fn at(mut self, line: u32) -> Self {
        self.position = Position::line(line);
        self.name.position = self.position;
        self
    }
}
