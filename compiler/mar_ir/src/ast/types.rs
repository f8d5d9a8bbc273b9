//! Syntactic type expressions.
//!
//! The tree only records what was written (`Integer[1, 10]`); resolving a
//! `TypeExpr` into a runtime type is the evaluator's job.

use std::fmt;

use crate::Position;

/// A type reference such as `String`, `Array[Integer]` or `Integer[0, default]`.
#[derive(Clone, PartialEq, Debug)]
pub struct TypeExpr {
    pub name: String,
    pub arguments: Vec<TypeArgument>,
    pub position: Position,
}

/// One argument inside the brackets of a type expression.
#[derive(Clone, PartialEq, Debug)]
pub enum TypeArgument {
    Type(TypeExpr),
    Integer(i64),
    Float(f64),
    String(String),
    Regex(String),
    Default,
}

impl TypeExpr {
    pub fn new(name: impl Into<String>) -> Self {
        TypeExpr {
            name: name.into(),
            arguments: Vec::new(),
            position: Position::DUMMY,
        }
    }

    #[must_use]
    pub fn with_argument(mut self, argument: TypeArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Shorthand for a parameterised type whose arguments are all types.
    #[must_use]
    pub fn of(mut self, types: impl IntoIterator<Item = TypeExpr>) -> Self {
        self.arguments.extend(types.into_iter().map(TypeArgument::Type));
        self
    }

    #[must_use]
    pub fn at(mut self, line: u32) -> Self {
        self.position = Position::line(line);
        self
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.arguments.is_empty() {
            return Ok(());
        }
        f.write_str("[")?;
        for (i, argument) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match argument {
                TypeArgument::Type(ty) => write!(f, "{ty}")?,
                TypeArgument::Integer(value) => write!(f, "{value}")?,
                TypeArgument::Float(value) => write!(f, "{value}")?,
                TypeArgument::String(value) => write!(f, "'{value}'")?,
                TypeArgument::Regex(value) => write!(f, "/{value}/")?,
                TypeArgument::Default => f.write_str("default")?,
            }
        }
        f.write_str("]")
    }
}
