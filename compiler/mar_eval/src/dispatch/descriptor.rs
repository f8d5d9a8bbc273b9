//! Dispatch descriptors and overload resolution.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use super::{CallContext, Signature};
use crate::errors::{internal, EvalError, EvalErrorKind, EvalResult};

/// Implementation of one candidate.
pub type Callback = Arc<dyn Fn(&mut CallContext<'_, '_>) -> EvalResult + Send + Sync>;

/// One (signature, callback) candidate.
#[derive(Clone)]
pub struct DispatchEntry {
    pub signature: Signature,
    callback: Callback,
}

impl fmt::Debug for DispatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchEntry")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// A named operator or function and its candidates, in registration order.
///
/// Built once, then shared read-only by every call made through it.
#[derive(Clone, Debug)]
pub struct Descriptor {
    name: String,
    entries: Vec<DispatchEntry>,
}

impl Descriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Descriptor {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a candidate. Earlier candidates take precedence.
    pub fn add<F>(&mut self, signature: Signature, callback: F)
    where
        F: Fn(&mut CallContext<'_, '_>) -> EvalResult + Send + Sync + 'static,
    {
        self.entries.push(DispatchEntry {
            signature,
            callback: Arc::new(callback),
        });
    }

    /// Builder form of [`Descriptor::add`].
    #[must_use]
    pub fn with<F>(mut self, signature: Signature, callback: F) -> Self
    where
        F: Fn(&mut CallContext<'_, '_>) -> EvalResult + Send + Sync + 'static,
    {
        self.add(signature, callback);
        self
    }

    /// A descriptor with no candidates must never be invoked.
    pub fn is_dispatchable(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn entries(&self) -> &[DispatchEntry] {
        &self.entries
    }

    /// Select the candidate for `call` without invoking it.
    pub fn select(&self, call: &CallContext<'_, '_>) -> Result<usize, EvalError> {
        let count = call.argument_count();

        // 1. Arity
        let by_arity: SmallVec<[usize; 8]> = (0..self.entries.len())
            .filter(|&index| self.entries[index].signature.accepts_count(count))
            .collect();
        if by_arity.is_empty() {
            return Err(EvalError::new(EvalErrorKind::ArityMismatch {
                name: self.name.clone(),
                expected: self.describe_arity(),
                actual: count,
            })
            .at(call.location().clone()));
        }

        // 2. Block
        let supplied = call.block_parameter_count();
        let mut first_reason = None;
        let by_block: SmallVec<[usize; 8]> = by_arity
            .into_iter()
            .filter(
                |&index| match self.entries[index].signature.block().check(supplied) {
                    Ok(()) => true,
                    Err(reason) => {
                        first_reason.get_or_insert(reason);
                        false
                    }
                },
            )
            .collect();
        if by_block.is_empty() {
            return Err(EvalError::new(EvalErrorKind::BlockArityMismatch {
                name: self.name.clone(),
                reason: first_reason.unwrap_or_default(),
            })
            .at(call.location().clone()));
        }

        // 3. Types; the first fitting candidate in registration order wins.
        let values = call.arguments().iter().map(|arg| &arg.value);
        let mut furthest: Option<(usize, Vec<String>)> = None;
        for index in by_block {
            let signature = &self.entries[index].signature;
            let Some(slot) = signature.first_rejected(values.clone()) else {
                return Ok(index);
            };
            let expected = signature
                .slot_type(slot)
                .map(ToString::to_string)
                .unwrap_or_default();
            let further = furthest.as_ref().map_or(true, |(best, _)| slot > *best);
            if further {
                furthest = Some((slot, vec![expected]));
            } else if let Some((best, types)) = &mut furthest {
                if *best == slot && !types.contains(&expected) {
                    types.push(expected);
                }
            }
        }

        let Some((slot, expected)) = furthest else {
            return Err(internal(format!("no candidate of '{}' was checked", self.name))
                .at(call.location().clone()));
        };
        let actual = call.argument(slot)?.type_name().to_string();
        Err(EvalError::new(EvalErrorKind::TypeMismatch {
            name: self.name.clone(),
            slot,
            expected: expected.join(" or "),
            actual,
        })
        .at(call.argument_location(slot)))
    }

    /// Select a candidate and invoke it.
    pub fn dispatch(&self, call: &mut CallContext<'_, '_>) -> EvalResult {
        if !self.is_dispatchable() {
            return Err(internal(format!("'{}' has no candidates", self.name))
                .at(call.location().clone()));
        }
        let index = self.select(call)?;
        tracing::trace!(name = %self.name, candidate = index, "dispatch");
        let callback = &self.entries[index].callback;
        callback(call).map_err(|error| error.at(call.location().clone()))
    }

    /// Union of accepted argument counts, e.g. `1 or 3 to 4 arguments`.
    fn describe_arity(&self) -> String {
        let mut ranges: Vec<(usize, Option<usize>)> = self
            .entries
            .iter()
            .map(|entry| (entry.signature.min_arity(), entry.signature.max_arity()))
            .collect();
        ranges.sort_unstable();

        let mut merged: Vec<(usize, Option<usize>)> = Vec::with_capacity(ranges.len());
        for (min, max) in ranges {
            if let Some((_, last_max)) = merged.last_mut() {
                match *last_max {
                    None => continue,
                    Some(end) if min <= end.saturating_add(1) => {
                        *last_max = max.map(|max| max.max(end));
                        continue;
                    }
                    Some(_) => {}
                }
            }
            merged.push((min, max));
        }

        let largest = merged.last().map_or(0, |&(min, max)| max.unwrap_or(min));
        let ranges: Vec<String> = merged
            .into_iter()
            .map(|(min, max)| match max {
                None => format!("at least {min}"),
                Some(max) if max == min => min.to_string(),
                Some(max) => format!("{min} to {max}"),
            })
            .collect();
        let noun = if largest == 1 { "argument" } else { "arguments" };
        format!("{} {noun}", ranges.join(" or "))
    }
}
