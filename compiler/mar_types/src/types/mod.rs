//! The runtime type model.
//!
//! Types are predicates over values. Dispatch signatures, parameter type
//! annotations and type literals all resolve to a [`Type`].
//!
//! Two relations matter:
//! - [`Type::is_instance`]: does a value belong to the type
//! - [`Type::is_assignable`]: is every instance of another type also an
//!   instance of this one (structural subtyping)

use std::fmt;

use regex::Regex;

use crate::Value;

/// A runtime type.
#[derive(Clone, Debug)]
pub enum Type {
    Any,
    Undef,
    Default,
    Boolean,
    /// Inclusive integer range; `None` bounds are open.
    Integer {
        from: Option<i64>,
        to: Option<i64>,
    },
    Float,
    /// Integer or Float.
    Numeric,
    String,
    /// Strings matching at least one of the patterns (any string if empty).
    Pattern(Vec<Regex>),
    /// One of the listed strings (any string if empty).
    Enum(Vec<String>),
    Regexp,
    /// Boolean, Numeric, String or Regexp.
    Scalar,
    /// Undef, Boolean, Numeric, String, `Array[Data]` or `Hash[String, Data]`.
    Data,
    Array(Box<Type>),
    Hash(Box<Type>, Box<Type>),
    /// Array or Hash.
    Collection,
    /// Anything `each` can iterate.
    Iterable,
    Optional(Box<Type>),
    Variant(Vec<Type>),
    NotUndef,
    /// Type of types, optionally restricted to subtypes of one type.
    Type(Option<Box<Type>>),
}

impl Type {
    /// `Integer` with no bounds.
    pub const INTEGER: Type = Type::Integer {
        from: None,
        to: None,
    };

    /// `Array` of anything.
    pub fn array() -> Type {
        Type::Array(Box::new(Type::Any))
    }

    /// `Hash` of anything.
    pub fn hash() -> Type {
        Type::Hash(Box::new(Type::Any), Box::new(Type::Any))
    }

    /// Look up an unparameterised type by name.
    pub fn from_name(name: &str) -> Option<Type> {
        let ty = match name {
            "Any" => Type::Any,
            "Undef" => Type::Undef,
            "Default" => Type::Default,
            "Boolean" => Type::Boolean,
            "Integer" => Type::INTEGER,
            "Float" => Type::Float,
            "Numeric" => Type::Numeric,
            "String" => Type::String,
            "Pattern" => Type::Pattern(Vec::new()),
            "Enum" => Type::Enum(Vec::new()),
            "Regexp" => Type::Regexp,
            "Scalar" => Type::Scalar,
            "Data" => Type::Data,
            "Array" => Type::array(),
            "Hash" => Type::hash(),
            "Collection" => Type::Collection,
            "Iterable" => Type::Iterable,
            "Optional" => Type::Optional(Box::new(Type::Any)),
            "Variant" => Type::Variant(Vec::new()),
            "NotUndef" => Type::NotUndef,
            "Type" => Type::Type(None),
            _ => return None,
        };
        Some(ty)
    }

    /// Check whether `value` is an instance of this type.
    pub fn is_instance(&self, value: &Value) -> bool {
        match self {
            Type::Any => true,
            Type::Undef => value.is_undef(),
            Type::Default => matches!(value, Value::Default),
            Type::Boolean => matches!(value, Value::Boolean(_)),
            Type::Integer { from, to } => value.as_integer().is_some_and(|n| {
                from.map_or(true, |lo| n >= lo) && to.map_or(true, |hi| n <= hi)
            }),
            Type::Float => matches!(value, Value::Float(_)),
            Type::Numeric => matches!(value, Value::Integer(_) | Value::Float(_)),
            Type::String => matches!(value, Value::String(_)),
            Type::Pattern(patterns) => value
                .as_str()
                .is_some_and(|s| patterns.is_empty() || patterns.iter().any(|re| re.is_match(s))),
            Type::Enum(names) => value
                .as_str()
                .is_some_and(|s| names.is_empty() || names.iter().any(|n| n == s)),
            Type::Regexp => matches!(value, Value::Regex(_)),
            Type::Scalar => matches!(
                value,
                Value::Boolean(_)
                    | Value::Integer(_)
                    | Value::Float(_)
                    | Value::String(_)
                    | Value::Regex(_)
            ),
            Type::Data => match value {
                Value::Undef
                | Value::Boolean(_)
                | Value::Integer(_)
                | Value::Float(_)
                | Value::String(_) => true,
                Value::Array(items) => items.iter().all(|item| Type::Data.is_instance(item)),
                Value::Hash(hash) => hash
                    .iter()
                    .all(|(k, v)| matches!(k, Value::String(_)) && Type::Data.is_instance(v)),
                _ => false,
            },
            Type::Array(element) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| element.is_instance(item))),
            Type::Hash(key, val) => value.as_hash().is_some_and(|hash| {
                hash.iter()
                    .all(|(k, v)| key.is_instance(k) && val.is_instance(v))
            }),
            Type::Collection => matches!(value, Value::Array(_) | Value::Hash(_)),
            Type::Iterable => matches!(
                value,
                Value::Array(_) | Value::Hash(_) | Value::String(_)
            ) || value.as_integer().is_some_and(|n| n >= 0),
            Type::Optional(inner) => value.is_undef() || inner.is_instance(value),
            Type::Variant(types) => types.iter().any(|ty| ty.is_instance(value)),
            Type::NotUndef => !value.is_undef(),
            Type::Type(None) => matches!(value, Value::Type(_)),
            Type::Type(Some(bound)) => value.as_type().is_some_and(|ty| bound.is_assignable(ty)),
        }
    }

    /// Check whether every instance of `other` is an instance of `self`.
    pub fn is_assignable(&self, other: &Type) -> bool {
        // Unions on the right are decomposed first so that e.g.
        // `Numeric` accepts `Variant[Integer, Float]`.
        match other {
            Type::Variant(types) => return types.iter().all(|ty| self.is_assignable(ty)),
            Type::Optional(inner) if !matches!(self, Type::Optional(_)) => {
                return self.is_assignable(&Type::Undef) && self.is_assignable(inner);
            }
            _ => {}
        }

        match self {
            Type::Any => true,
            Type::Undef => matches!(other, Type::Undef),
            Type::Default => matches!(other, Type::Default),
            Type::Boolean => matches!(other, Type::Boolean),
            Type::Integer { from, to } => match other {
                Type::Integer {
                    from: other_from,
                    to: other_to,
                } => {
                    let lower_ok = match (from, other_from) {
                        (None, _) => true,
                        (Some(_), None) => false,
                        (Some(lo), Some(other_lo)) => other_lo >= lo,
                    };
                    let upper_ok = match (to, other_to) {
                        (None, _) => true,
                        (Some(_), None) => false,
                        (Some(hi), Some(other_hi)) => other_hi <= hi,
                    };
                    lower_ok && upper_ok
                }
                _ => false,
            },
            Type::Float => matches!(other, Type::Float),
            Type::Numeric => matches!(other, Type::Integer { .. } | Type::Float | Type::Numeric),
            Type::String => other.is_string_like(),
            Type::Pattern(patterns) => match other {
                _ if patterns.is_empty() => other.is_string_like(),
                Type::Pattern(others) => !others.is_empty()
                    && others
                        .iter()
                        .all(|o| patterns.iter().any(|p| p.as_str() == o.as_str())),
                Type::Enum(names) => {
                    !names.is_empty()
                        && names
                            .iter()
                            .all(|name| patterns.iter().any(|re| re.is_match(name)))
                }
                _ => false,
            },
            Type::Enum(names) => match other {
                _ if names.is_empty() => other.is_string_like(),
                Type::Enum(others) => {
                    !others.is_empty() && others.iter().all(|o| names.contains(o))
                }
                _ => false,
            },
            Type::Regexp => matches!(other, Type::Regexp),
            Type::Scalar => other.is_scalar_like(),
            Type::Data => match other {
                Type::Undef | Type::Data => true,
                Type::Array(element) => Type::Data.is_assignable(element),
                Type::Hash(key, value) => {
                    Type::String.is_assignable(key) && Type::Data.is_assignable(value)
                }
                Type::Regexp => false,
                _ => other.is_scalar_like(),
            },
            Type::Array(element) => match other {
                Type::Array(other_element) => element.is_assignable(other_element),
                _ => false,
            },
            Type::Hash(key, value) => match other {
                Type::Hash(other_key, other_value) => {
                    key.is_assignable(other_key) && value.is_assignable(other_value)
                }
                _ => false,
            },
            Type::Collection => {
                matches!(other, Type::Array(_) | Type::Hash(..) | Type::Collection)
            }
            Type::Iterable => {
                matches!(
                    other,
                    Type::Array(_) | Type::Hash(..) | Type::Collection | Type::Iterable
                ) || other.is_string_like()
                    || matches!(other, Type::Integer { from: Some(lo), .. } if *lo >= 0)
            }
            Type::Optional(inner) => match other {
                Type::Undef => true,
                Type::Optional(other_inner) => inner.is_assignable(other_inner),
                _ => inner.is_assignable(other),
            },
            Type::Variant(types) => types.iter().any(|ty| ty.is_assignable(other)),
            Type::NotUndef => !other.is_assignable(&Type::Undef),
            Type::Type(bound) => match (bound, other) {
                (None, Type::Type(_)) => true,
                (Some(bound), Type::Type(Some(other_bound))) => bound.is_assignable(other_bound),
                _ => false,
            },
        }
    }

    fn is_string_like(&self) -> bool {
        matches!(self, Type::String | Type::Pattern(_) | Type::Enum(_))
    }

    fn is_scalar_like(&self) -> bool {
        self.is_string_like()
            || matches!(
                self,
                Type::Boolean
                    | Type::Integer { .. }
                    | Type::Float
                    | Type::Numeric
                    | Type::Regexp
                    | Type::Scalar
            )
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Pattern(a), Type::Pattern(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.as_str() == y.as_str())
            }
            (Type::Integer { from, to }, Type::Integer { from: f, to: t }) => from == f && to == t,
            (Type::Enum(a), Type::Enum(b)) => a == b,
            (Type::Array(a), Type::Array(b)) => a == b,
            (Type::Hash(k1, v1), Type::Hash(k2, v2)) => k1 == k2 && v1 == v2,
            (Type::Optional(a), Type::Optional(b)) => a == b,
            (Type::Variant(a), Type::Variant(b)) => a == b,
            (Type::Type(a), Type::Type(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

fn write_list<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    mut write: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write(f, item)?;
    }
    f.write_str("]")
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => f.write_str("Any"),
            Type::Undef => f.write_str("Undef"),
            Type::Default => f.write_str("Default"),
            Type::Boolean => f.write_str("Boolean"),
            Type::Integer { from, to } => {
                f.write_str("Integer")?;
                match (from, to) {
                    (None, None) => Ok(()),
                    (Some(lo), None) => write!(f, "[{lo}, default]"),
                    (None, Some(hi)) => write!(f, "[default, {hi}]"),
                    (Some(lo), Some(hi)) => write!(f, "[{lo}, {hi}]"),
                }
            }
            Type::Float => f.write_str("Float"),
            Type::Numeric => f.write_str("Numeric"),
            Type::String => f.write_str("String"),
            Type::Pattern(patterns) => {
                f.write_str("Pattern")?;
                if patterns.is_empty() {
                    return Ok(());
                }
                write_list(f, patterns, |f, re| write!(f, "/{}/", re.as_str()))
            }
            Type::Enum(names) => {
                f.write_str("Enum")?;
                if names.is_empty() {
                    return Ok(());
                }
                write_list(f, names, |f, name| write!(f, "'{name}'"))
            }
            Type::Regexp => f.write_str("Regexp"),
            Type::Scalar => f.write_str("Scalar"),
            Type::Data => f.write_str("Data"),
            Type::Array(element) => match **element {
                Type::Any => f.write_str("Array"),
                _ => write!(f, "Array[{element}]"),
            },
            Type::Hash(key, value) => match (&**key, &**value) {
                (Type::Any, Type::Any) => f.write_str("Hash"),
                _ => write!(f, "Hash[{key}, {value}]"),
            },
            Type::Collection => f.write_str("Collection"),
            Type::Iterable => f.write_str("Iterable"),
            Type::Optional(inner) => write!(f, "Optional[{inner}]"),
            Type::Variant(types) => {
                f.write_str("Variant")?;
                write_list(f, types, |f, ty| write!(f, "{ty}"))
            }
            Type::NotUndef => f.write_str("NotUndef"),
            Type::Type(None) => f.write_str("Type"),
            Type::Type(Some(bound)) => write!(f, "Type[{bound}]"),
        }
    }
}

#[cfg(test)]
mod tests;
