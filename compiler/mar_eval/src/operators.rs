//! Built-in operator descriptors.
//!
//! Each operator is a [`Descriptor`] whose candidates are tried in the
//! order they are registered here, so more specific signatures (integer
//! arithmetic) come before more general ones (numeric arithmetic). Integer
//! arithmetic is checked; overflow and division by zero are errors.

use std::cmp::Ordering;
use std::sync::Arc;

use mar_ir::{BinaryOp, UnaryOp};
use mar_types::{HashValue, Type, Value};
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::dispatch::{BlockArity, CallContext, Descriptor, Signature};
use crate::errors::{
    arithmetic_overflow, division_by_zero, internal, invalid_regex, EvalError, EvalResult,
};

/// Operator descriptors of one compilation.
#[derive(Clone, Debug)]
pub struct OperatorTable {
    binary: FxHashMap<BinaryOp, Arc<Descriptor>>,
    unary: FxHashMap<UnaryOp, Arc<Descriptor>>,
}

impl Default for OperatorTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl OperatorTable {
    /// Descriptors for every binary and unary operator.
    pub fn builtin() -> Self {
        let binary = BinaryOp::ALL
            .into_iter()
            .map(|op| (op, Arc::new(binary_descriptor(op))))
            .collect();
        let unary = UnaryOp::ALL
            .into_iter()
            .map(|op| (op, Arc::new(unary_descriptor(op))))
            .collect();
        OperatorTable { binary, unary }
    }

    pub fn binary(&self, op: BinaryOp) -> Option<Arc<Descriptor>> {
        self.binary.get(&op).cloned()
    }

    pub fn unary(&self, op: UnaryOp) -> Option<Arc<Descriptor>> {
        self.unary.get(&op).cloned()
    }
}

fn pair(left: Type, right: Type) -> Signature {
    Signature::new(vec![left, right])
}

fn binary_descriptor(op: BinaryOp) -> Descriptor {
    let descriptor = Descriptor::new(op.as_symbol());
    match op {
        BinaryOp::Plus => descriptor
            .with(pair(Type::INTEGER, Type::INTEGER), |call| {
                let (a, b) = integers(call)?;
                checked_arith(a.checked_add(b), "+")
            })
            .with(pair(Type::Numeric, Type::Numeric), |call| {
                let (a, b) = numbers(call)?;
                Ok(Value::Float(a + b))
            })
            .with(pair(Type::array(), Type::array()), |call| {
                let (a, b) = arrays(call)?;
                Ok(Value::array(a.iter().chain(b).cloned().collect()))
            })
            .with(pair(Type::hash(), Type::hash()), |call| {
                let (a, b) = hashes(call)?;
                let merged = a
                    .iter()
                    .chain(b.iter())
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                Ok(Value::hash(merged))
            })
            .with(pair(Type::array(), Type::Any), append),
        BinaryOp::Minus => descriptor
            .with(pair(Type::INTEGER, Type::INTEGER), |call| {
                let (a, b) = integers(call)?;
                checked_arith(a.checked_sub(b), "-")
            })
            .with(pair(Type::Numeric, Type::Numeric), |call| {
                let (a, b) = numbers(call)?;
                Ok(Value::Float(a - b))
            })
            .with(pair(Type::array(), Type::array()), |call| {
                let (a, b) = arrays(call)?;
                Ok(Value::array(
                    a.iter()
                        .filter(|item| !b.iter().any(|other| item.loose_eq(other)))
                        .cloned()
                        .collect(),
                ))
            })
            .with(pair(Type::hash(), Type::hash()), |call| {
                let (a, b) = hashes(call)?;
                Ok(Value::hash(without_keys(a, |key| b.get_loose(key).is_some())))
            })
            .with(pair(Type::hash(), Type::array()), |call| {
                let hash = call.left()?.as_hash().ok_or_else(|| signature_bug(call))?;
                let keys = call.right()?.as_array().ok_or_else(|| signature_bug(call))?;
                Ok(Value::hash(without_keys(hash, |key| keys.iter().any(|k| k.loose_eq(key)))))
            })
            .with(pair(Type::array(), Type::Any), |call| {
                let items = call.left()?.as_array().ok_or_else(|| signature_bug(call))?;
                let removed = call.right()?;
                Ok(Value::array(
                    items.iter().filter(|item| !item.loose_eq(removed)).cloned().collect(),
                ))
            }),
        BinaryOp::Multiply => descriptor
            .with(pair(Type::INTEGER, Type::INTEGER), |call| {
                let (a, b) = integers(call)?;
                checked_arith(a.checked_mul(b), "*")
            })
            .with(pair(Type::Numeric, Type::Numeric), |call| {
                let (a, b) = numbers(call)?;
                Ok(Value::Float(a * b))
            }),
        BinaryOp::Divide => descriptor
            .with(pair(Type::INTEGER, Type::INTEGER), |call| {
                let (a, b) = integers(call)?;
                if b == 0 {
                    return Err(division_by_zero());
                }
                checked_arith(a.checked_div(b), "/")
            })
            .with(pair(Type::Numeric, Type::Numeric), |call| {
                let (a, b) = numbers(call)?;
                if b == 0.0 {
                    return Err(division_by_zero());
                }
                Ok(Value::Float(a / b))
            }),
        BinaryOp::Modulo => descriptor.with(pair(Type::INTEGER, Type::INTEGER), |call| {
            let (a, b) = integers(call)?;
            if b == 0 {
                return Err(division_by_zero());
            }
            checked_arith(a.checked_rem(b), "%")
        }),
        BinaryOp::LeftShift => descriptor
            .with(pair(Type::INTEGER, Type::INTEGER), |call| {
                let (a, b) = integers(call)?;
                shift(a, b, "<<")
            })
            .with(pair(Type::array(), Type::Any), append),
        BinaryOp::RightShift => descriptor.with(pair(Type::INTEGER, Type::INTEGER), |call| {
            let (a, b) = integers(call)?;
            let amount = b.checked_neg().ok_or_else(|| arithmetic_overflow(">>"))?;
            shift(a, amount, ">>")
        }),
        BinaryOp::Equals => descriptor.with(pair(Type::Any, Type::Any), |call| {
            Ok(Value::Boolean(call.left()?.loose_eq(call.right()?)))
        }),
        BinaryOp::NotEquals => descriptor.with(pair(Type::Any, Type::Any), |call| {
            Ok(Value::Boolean(!call.left()?.loose_eq(call.right()?)))
        }),
        BinaryOp::Less => comparison(descriptor, Ordering::is_lt),
        BinaryOp::LessEqual => comparison(descriptor, Ordering::is_le),
        BinaryOp::Greater => comparison(descriptor, Ordering::is_gt),
        BinaryOp::GreaterEqual => comparison(descriptor, Ordering::is_ge),
        BinaryOp::Match => matching(descriptor, true),
        BinaryOp::NotMatch => matching(descriptor, false),
        BinaryOp::In => descriptor
            .with(pair(Type::String, Type::String), |call| {
                let (needle, haystack) = strings(call)?;
                Ok(Value::Boolean(haystack.to_lowercase().contains(&needle.to_lowercase())))
            })
            .with(pair(Type::Regexp, Type::String), |call| {
                let Value::Regex(regex) = call.left()? else {
                    return Err(signature_bug(call));
                };
                let haystack = call.right()?.as_str().ok_or_else(|| signature_bug(call))?;
                Ok(Value::Boolean(regex.is_match(haystack)))
            })
            .with(pair(Type::Regexp, Type::array()), |call| {
                let Value::Regex(regex) = call.left()? else {
                    return Err(signature_bug(call));
                };
                let items = call.right()?.as_array().ok_or_else(|| signature_bug(call))?;
                Ok(Value::Boolean(
                    items.iter().filter_map(Value::as_str).any(|s| regex.is_match(s)),
                ))
            })
            .with(pair(Type::Type(None), Type::array()), |call| {
                let ty = call.left()?.as_type().ok_or_else(|| signature_bug(call))?;
                let items = call.right()?.as_array().ok_or_else(|| signature_bug(call))?;
                Ok(Value::Boolean(items.iter().any(|item| ty.is_instance(item))))
            })
            .with(pair(Type::Any, Type::array()), |call| {
                let needle = call.left()?;
                let items = call.right()?.as_array().ok_or_else(|| signature_bug(call))?;
                Ok(Value::Boolean(items.iter().any(|item| item.loose_eq(needle))))
            })
            .with(pair(Type::Any, Type::hash()), |call| {
                let needle = call.left()?;
                let hash = call.right()?.as_hash().ok_or_else(|| signature_bug(call))?;
                Ok(Value::Boolean(hash.get_loose(needle).is_some()))
            }),
        BinaryOp::LogicalAnd => descriptor.with(deferred(), |call| {
            if !call.left()?.is_truthy() {
                return Ok(Value::Boolean(false));
            }
            Ok(Value::Boolean(call.yield_block(Vec::new())?.is_truthy()))
        }),
        BinaryOp::LogicalOr => descriptor.with(deferred(), |call| {
            if call.left()?.is_truthy() {
                return Ok(Value::Boolean(true));
            }
            Ok(Value::Boolean(call.yield_block(Vec::new())?.is_truthy()))
        }),
    }
}

/// `and`/`or`: one operand plus the right-hand side as a block.
fn deferred() -> Signature {
    Signature::new(vec![Type::Any]).with_block(BlockArity::required(0, 0))
}

fn unary_descriptor(op: UnaryOp) -> Descriptor {
    let descriptor = Descriptor::new(op.as_symbol());
    match op {
        UnaryOp::Negate => descriptor
            .with(Signature::new(vec![Type::INTEGER]), |call| {
                let n = call.argument(0)?.as_integer().ok_or_else(|| signature_bug(call))?;
                checked_arith(n.checked_neg(), "-")
            })
            .with(Signature::new(vec![Type::Float]), |call| match call.argument(0)? {
                Value::Float(f) => Ok(Value::Float(-f)),
                _ => Err(signature_bug(call)),
            }),
        UnaryOp::LogicalNot => descriptor.with(Signature::new(vec![Type::Any]), |call| {
            Ok(Value::Boolean(!call.argument(0)?.is_truthy()))
        }),
    }
}

/// Register `<`-style candidates for numbers, strings and types.
fn comparison(descriptor: Descriptor, test: fn(Ordering) -> bool) -> Descriptor {
    let compare = move |call: &mut CallContext<'_, '_>| -> EvalResult {
        Ok(Value::Boolean(ordering(call)?.is_some_and(test)))
    };
    descriptor
        .with(pair(Type::Numeric, Type::Numeric), compare)
        .with(pair(Type::String, Type::String), compare)
        .with(pair(Type::Type(None), Type::Type(None)), compare)
}

fn ordering(call: &CallContext<'_, '_>) -> Result<Option<Ordering>, EvalError> {
    Ok(match (call.left()?, call.right()?) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.to_lowercase().cmp(&b.to_lowercase())),
        // A type is less than the types it is assignable to.
        (Value::Type(a), Value::Type(b)) => match (b.is_assignable(a), a.is_assignable(b)) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (false, false) => None,
        },
        (a, b) => match (a.as_float(), b.as_float()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => return Err(signature_bug(call)),
        },
    })
}

/// Register `=~` (or `!~` when `expected` is false).
fn matching(descriptor: Descriptor, expected: bool) -> Descriptor {
    let test = move |call: &mut CallContext<'_, '_>| -> EvalResult {
        Ok(Value::Boolean(is_match(call)? == expected))
    };
    descriptor
        .with(pair(Type::String, Type::Regexp), test)
        .with(pair(Type::String, Type::String), test)
        .with(pair(Type::Any, Type::Type(None)), test)
}

fn is_match(call: &CallContext<'_, '_>) -> Result<bool, EvalError> {
    match (call.left()?, call.right()?) {
        (Value::String(s), Value::Regex(regex)) => Ok(regex.is_match(s)),
        (Value::String(s), Value::String(pattern)) => {
            let regex = Regex::new(pattern).map_err(|error| {
                invalid_regex(pattern, &error).at(call.argument_location(1))
            })?;
            Ok(regex.is_match(s))
        }
        (value, Value::Type(ty)) => Ok(ty.is_instance(value)),
        _ => Err(signature_bug(call)),
    }
}

// Operand access. A callback only sees operands its signature accepted, so
// a shape mismatch here is a bug in the table, not in the manifest.

fn signature_bug(call: &CallContext<'_, '_>) -> EvalError {
    internal(format!(
        "'{}' received operands its signature does not accept",
        call.name()
    ))
    .at(call.location().clone())
}

fn integers(call: &CallContext<'_, '_>) -> Result<(i64, i64), EvalError> {
    match (call.left()?.as_integer(), call.right()?.as_integer()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(signature_bug(call)),
    }
}

fn numbers(call: &CallContext<'_, '_>) -> Result<(f64, f64), EvalError> {
    match (call.left()?.as_float(), call.right()?.as_float()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(signature_bug(call)),
    }
}

fn strings<'v>(call: &'v CallContext<'_, '_>) -> Result<(&'v str, &'v str), EvalError> {
    match (call.left()?.as_str(), call.right()?.as_str()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(signature_bug(call)),
    }
}

fn arrays<'v>(call: &'v CallContext<'_, '_>) -> Result<(&'v [Value], &'v [Value]), EvalError> {
    match (call.left()?.as_array(), call.right()?.as_array()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(signature_bug(call)),
    }
}

fn hashes<'v>(
    call: &'v CallContext<'_, '_>,
) -> Result<(&'v HashValue, &'v HashValue), EvalError> {
    match (call.left()?.as_hash(), call.right()?.as_hash()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(signature_bug(call)),
    }
}

fn checked_arith(result: Option<i64>, op: &str) -> EvalResult {
    result.map(Value::Integer).ok_or_else(|| arithmetic_overflow(op))
}

/// Shift left by `amount`, or right when `amount` is negative.
fn shift(value: i64, amount: i64, op: &str) -> EvalResult {
    let Ok(bits) = u32::try_from(amount.unsigned_abs()) else {
        return Err(arithmetic_overflow(op));
    };
    if amount >= 0 {
        let shifted = value.checked_shl(bits).ok_or_else(|| arithmetic_overflow(op))?;
        if shifted >> bits != value {
            return Err(arithmetic_overflow(op));
        }
        Ok(Value::Integer(shifted))
    } else {
        // Shifting right past the width leaves only the sign.
        Ok(Value::Integer(value.checked_shr(bits).unwrap_or(value >> 63)))
    }
}

/// `[1, 2] << 3`, `[1, 2] + 3`
fn append(call: &mut CallContext<'_, '_>) -> EvalResult {
    let items = call.left()?.as_array().ok_or_else(|| signature_bug(call))?;
    let mut items = items.to_vec();
    items.push(call.right()?.clone());
    Ok(Value::array(items))
}

fn without_keys(hash: &HashValue, remove: impl Fn(&Value) -> bool) -> HashValue {
    hash.iter()
        .filter(|(key, _)| !remove(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
