//! Built-in functions.

use mar_diagnostic::Severity;
use mar_types::{HashValue, Type, Value};

use crate::class_definition::ClassName;
use crate::dispatch::{BlockArity, CallContext, Descriptor, Signature};
use crate::errors::{evaluation_failure, internal, EvalResult};

/// Every built-in, keyed by name.
pub(super) fn descriptors() -> Vec<(&'static str, Descriptor)> {
    let mut descriptors = vec![
        ("include", include()),
        ("defined", defined()),
        ("each", iteration("each", each)),
        ("map", iteration("map", map)),
        ("filter", iteration("filter", filter)),
        ("with", with()),
        ("fail", fail()),
    ];
    for (name, severity) in [
        ("debug", Severity::Debug),
        ("info", Severity::Info),
        ("notice", Severity::Notice),
        ("warning", Severity::Warning),
        ("err", Severity::Error),
    ] {
        descriptors.push((name, logging(name, severity)));
    }
    descriptors
}

/// `String` or `Array[String]`.
fn names() -> Type {
    Type::Variant(vec![Type::String, Type::Array(Box::new(Type::String))])
}

fn flatten_names(values: &[Value]) -> Vec<String> {
    let mut names = Vec::new();
    for value in values {
        match value {
            Value::Array(items) => names.extend(items.iter().map(ToString::to_string)),
            other => names.push(other.to_string()),
        }
    }
    names
}

/// Message text of the logging functions and `fail`: arguments joined by a space.
fn message(values: &[Value]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `include a, [b, c]`
fn include() -> Descriptor {
    Descriptor::new("include").with(Signature::new(vec![names()]).rest(names()), |call| {
        let location = call.location().clone();
        for name in flatten_names(&call.values()) {
            call.context()
                .declare_class(&ClassName::new(&name), &location, None)?;
        }
        Ok(Value::Undef)
    })
}

/// `defined('apache')`, `defined(['$port', 'nginx'])`: whether any of the
/// names is a class, function, defined type or bound variable.
fn defined() -> Descriptor {
    Descriptor::new("defined").with(
        Signature::new(vec![names()]).rest(names()),
        |call| {
            let names = flatten_names(&call.values());
            let context = call.context();
            let found = names.iter().any(|name| match name.strip_prefix('$') {
                Some(variable) => context.find_variable(variable).is_some(),
                None => {
                    context.is_class_defined(&ClassName::new(name))
                        || context.functions().is_defined(name)
                        || context.defined_type(name).is_some()
                }
            });
            Ok(Value::Boolean(found))
        },
    )
}

/// `with(1, 2) |$a, $b| { ... }`
fn with() -> Descriptor {
    Descriptor::new("with").with(
        Signature::new(Vec::new())
            .rest(Type::Any)
            .with_block(BlockArity::required_any()),
        |call| {
            let values = call.values();
            call.yield_block(values)
        },
    )
}

fn fail() -> Descriptor {
    Descriptor::new("fail").with(Signature::new(Vec::new()).rest(Type::Any), |call| {
        Err(evaluation_failure(message(&call.values())).at(call.location().clone()))
    })
}

fn logging(name: &'static str, severity: Severity) -> Descriptor {
    Descriptor::new(name).with(
        Signature::new(Vec::new()).rest(Type::Any),
        move |call: &mut CallContext<'_, '_>| -> EvalResult {
            let text = message(&call.values());
            let location = call.location().clone();
            call.context().log(severity, Some(location), text);
            Ok(Value::Undef)
        },
    )
}

/// Each element with the block arguments for it. Produced lazily, so a
/// large integer iterates without allocating every round up front.
type Rounds<'a> = Box<dyn Iterator<Item = (Value, Vec<Value>)> + 'a>;

type Iteration = fn(&mut CallContext<'_, '_>, &Value, Rounds<'_>) -> EvalResult;

/// `each`, `map` and `filter` take an iterable and a block of one or two
/// parameters.
fn iteration(name: &'static str, body: Iteration) -> Descriptor {
    Descriptor::new(name).with(
        Signature::new(vec![Type::Iterable]).with_block(BlockArity::required(1, 2)),
        move |call: &mut CallContext<'_, '_>| -> EvalResult {
            let subject = call.argument(0)?.clone();
            let pairs = call.block_parameter_count() == Some(2);
            let Some(rounds) = rounds(&subject, pairs) else {
                return Err(internal(format!("'{name}' cannot iterate a {}", subject.type_name()))
                    .at(call.location().clone()));
            };
            body(call, &subject, rounds)
        },
    )
}

/// Block arguments are `[element]`, or `[index, element]` / `[key, value]`
/// when the block takes two parameters. Hash elements are `[key, value]`
/// arrays.
fn rounds(subject: &Value, pairs: bool) -> Option<Rounds<'_>> {
    let indexed = move |(index, item): (usize, Value)| {
        let arguments = if pairs {
            let index = i64::try_from(index).unwrap_or(i64::MAX);
            vec![Value::Integer(index), item.clone()]
        } else {
            vec![item.clone()]
        };
        (item, arguments)
    };
    let rounds: Rounds<'_> = match subject {
        Value::Array(items) => Box::new(items.iter().cloned().enumerate().map(indexed)),
        Value::String(s) => Box::new(
            s.chars()
                .map(|c| Value::string(c.to_string()))
                .enumerate()
                .map(indexed),
        ),
        Value::Integer(n) if *n >= 0 => {
            Box::new((0..*n).map(Value::Integer).enumerate().map(indexed))
        }
        Value::Hash(hash) => Box::new(hash.iter().map(move |(key, value)| {
            let entry = Value::array(vec![key.clone(), value.clone()]);
            let arguments = if pairs {
                vec![key.clone(), value.clone()]
            } else {
                vec![entry.clone()]
            };
            (entry, arguments)
        })),
        _ => return None,
    };
    Some(rounds)
}

/// Yields per element; evaluates to the subject.
fn each(call: &mut CallContext<'_, '_>, subject: &Value, rounds: Rounds<'_>) -> EvalResult {
    for (_, arguments) in rounds {
        call.yield_block(arguments)?;
    }
    Ok(subject.clone())
}

fn map(call: &mut CallContext<'_, '_>, _subject: &Value, rounds: Rounds<'_>) -> EvalResult {
    let mut mapped = Vec::new();
    for (_, arguments) in rounds {
        mapped.push(call.yield_block(arguments)?);
    }
    Ok(Value::array(mapped))
}

/// Keeps the elements the block is truthy for. A hash filters to a hash.
fn filter(call: &mut CallContext<'_, '_>, subject: &Value, rounds: Rounds<'_>) -> EvalResult {
    let mut kept = Vec::new();
    for (element, arguments) in rounds {
        if call.yield_block(arguments)?.is_truthy() {
            kept.push(element);
        }
    }
    match subject {
        Value::Hash(_) => Ok(Value::hash(
            kept.into_iter()
                .filter_map(|entry| match entry.as_array() {
                    Some([key, value]) => Some((key.clone(), value.clone())),
                    _ => None,
                })
                .collect::<HashValue>(),
        )),
        _ => Ok(Value::array(kept)),
    }
}
