//! Binary and unary operators.
//!
//! Every operator is evaluated through a dispatch descriptor keyed by the
//! operator, so these enums are only identifiers; they carry no semantics.

use std::fmt;

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    // Arithmetic
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    LeftShift,
    RightShift,

    // Comparison
    Equals,
    NotEquals,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // Matching
    Match,
    NotMatch,
    In,

    // Logical (right operand is deferred)
    LogicalAnd,
    LogicalOr,
}

impl BinaryOp {
    /// All binary operators, in table order.
    pub const ALL: [BinaryOp; 18] = [
        Self::Plus,
        Self::Minus,
        Self::Multiply,
        Self::Divide,
        Self::Modulo,
        Self::LeftShift,
        Self::RightShift,
        Self::Equals,
        Self::NotEquals,
        Self::Less,
        Self::LessEqual,
        Self::Greater,
        Self::GreaterEqual,
        Self::Match,
        Self::NotMatch,
        Self::In,
        Self::LogicalAnd,
        Self::LogicalOr,
    ];

    /// Returns the source-level symbol for this operator.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Match => "=~",
            Self::NotMatch => "!~",
            Self::In => "in",
            Self::LogicalAnd => "and",
            Self::LogicalOr => "or",
        }
    }

    /// Whether the right operand is passed as a deferred block rather than a value.
    pub const fn is_short_circuit(self) -> bool {
        matches!(self, Self::LogicalAnd | Self::LogicalOr)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Negate,
    LogicalNot,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 2] = [Self::Negate, Self::LogicalNot];

    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Negate => "-",
            Self::LogicalNot => "!",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}
