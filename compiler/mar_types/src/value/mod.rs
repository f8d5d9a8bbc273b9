//! Runtime values.
//!
//! # Arc Enforcement
//!
//! Heap values (`String`, `Regex`, `Array`, `Hash`, `Type`) are wrapped in
//! [`Heap`], whose constructor is private to this module. Use the factory
//! methods:
//!
//! ```text
//! let s = Value::string("hello");
//! let a = Value::array(vec![Value::Integer(1)]);
//! ```

mod hash;
mod heap;

use std::fmt;

use regex::Regex;

use crate::Type;

pub use hash::HashValue;
pub use heap::Heap;

/// Runtime value of a manifest expression.
#[derive(Clone, Debug)]
pub enum Value {
    // Primitives
    Undef,
    /// The `default` keyword.
    Default,
    Boolean(bool),
    Integer(i64),
    Float(f64),

    // Heap types
    String(Heap<String>),
    Regex(Heap<Regex>),
    Array(Heap<Vec<Value>>),
    /// Insertion-ordered hash.
    Hash(Heap<HashValue>),
    Type(Heap<Type>),
}

// Factory Methods (ONLY way to construct heap values)

impl Value {
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(Heap::new(s.into()))
    }

    #[inline]
    pub fn regex(regex: Regex) -> Self {
        Value::Regex(Heap::new(regex))
    }

    #[inline]
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Heap::new(items))
    }

    #[inline]
    pub fn hash(entries: HashValue) -> Self {
        Value::Hash(Heap::new(entries))
    }

    #[inline]
    pub fn type_value(ty: Type) -> Self {
        Value::Type(Heap::new(ty))
    }
}

impl Value {
    /// Only `undef` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Undef | Value::Boolean(false))
    }

    pub fn is_undef(&self) -> bool {
        matches!(self, Value::Undef)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view of an integer or float.
    #[expect(clippy::cast_precision_loss, reason = "manifest numerics are f64")]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&HashValue> {
        match self {
            Value::Hash(hash) => Some(hash),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&Type> {
        match self {
            Value::Type(ty) => Some(ty),
            _ => None,
        }
    }

    /// Name of the value's runtime type, as used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undef => "Undef",
            Value::Default => "Default",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Regex(_) => "Regexp",
            Value::Array(_) => "Array",
            Value::Hash(_) => "Hash",
            Value::Type(_) => "Type",
        }
    }

    /// Equality used by the `==` operator.
    ///
    /// Strings compare case-insensitively, integers and floats compare
    /// numerically, and collections compare element-wise with the same rules.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => {
                a.len() == b.len() && a.to_lowercase() == b.to_lowercase()
            }
            (Value::Integer(_), Value::Float(_)) | (Value::Float(_), Value::Integer(_)) => {
                self.as_float() == other.as_float()
            }
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.loose_eq(y))
            }
            (Value::Hash(a), Value::Hash(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get_loose(k).is_some_and(|other| v.loose_eq(other)))
            }
            _ => self == other,
        }
    }
}

impl PartialEq for Value {
    #[allow(clippy::float_cmp, reason = "manifest equality is exact")]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undef, Value::Undef) | (Value::Default, Value::Default) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Regex(a), Value::Regex(b)) => a.as_str() == b.as_str(),
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Hash(a), Value::Hash(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::string(value)
    }
}

fn fmt_float(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e16 {
        write!(f, "{n:.1}")
    } else {
        write!(f, "{n}")
    }
}

/// String conversion; `undef` converts to the empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undef => Ok(()),
            Value::Default => f.write_str("default"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(n) => fmt_float(f, *n),
            Value::String(s) => f.write_str(s),
            Value::Regex(re) => write!(f, "/{}/", re.as_str()),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Hash(hash) => write!(f, "{hash}"),
            Value::Type(ty) => write!(f, "{ty}"),
        }
    }
}
