//! Call signatures.

use mar_types::{Type, Value};

/// Block requirement of a signature, with the accepted range of block
/// parameter counts.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum BlockArity {
    /// Calls must not pass a block.
    #[default]
    None,
    Optional {
        min: usize,
        max: usize,
    },
    Required {
        min: usize,
        max: usize,
    },
}

fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

impl BlockArity {
    pub fn optional(min: usize, max: usize) -> Self {
        BlockArity::Optional {
            min,
            max: max.max(min),
        }
    }

    pub fn required(min: usize, max: usize) -> Self {
        BlockArity::Required {
            min,
            max: max.max(min),
        }
    }

    /// Any number of block parameters.
    pub fn required_any() -> Self {
        BlockArity::required(0, usize::MAX)
    }

    /// Check a call's block, given as its parameter count.
    ///
    /// On rejection, returns the reason as it should appear after the
    /// callee's name in a diagnostic.
    pub fn check(self, supplied: Option<usize>) -> Result<(), String> {
        match (self, supplied) {
            (BlockArity::None, None) | (BlockArity::Optional { .. }, None) => Ok(()),
            (BlockArity::Required { .. }, None) => Err("requires a block".to_string()),
            (BlockArity::None, Some(_)) => Err("does not accept a block".to_string()),
            (
                BlockArity::Optional { min, max } | BlockArity::Required { min, max },
                Some(count),
            ) => {
                if (min..=max).contains(&count) {
                    return Ok(());
                }
                let largest = if max == usize::MAX { min } else { max };
                let expected = if max == usize::MAX {
                    format!("at least {min}")
                } else if min == max {
                    min.to_string()
                } else {
                    format!("{min} to {max}")
                };
                Err(format!(
                    "expects a block with {expected} parameter{} but was given a block \
                     with {count} parameter{}",
                    plural_s(largest),
                    plural_s(count)
                ))
            }
        }
    }
}

/// The arity, slot types and block requirement one candidate accepts.
///
/// Slots `0..required` are mandatory, the remaining declared slots are
/// optional, and a rest type, if any, applies to every further argument.
#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    parameters: Vec<Type>,
    required: usize,
    rest: Option<Type>,
    block: BlockArity,
}

impl Signature {
    /// A signature taking exactly one argument per listed type.
    pub fn new(parameters: Vec<Type>) -> Self {
        let required = parameters.len();
        Signature {
            parameters,
            required,
            rest: None,
            block: BlockArity::None,
        }
    }

    /// Make the slots from `index` on optional.
    #[must_use]
    pub fn optional_from(mut self, index: usize) -> Self {
        self.required = index.min(self.parameters.len());
        self
    }

    /// Accept any number of trailing arguments of type `ty`.
    #[must_use]
    pub fn rest(mut self, ty: Type) -> Self {
        self.rest = Some(ty);
        self
    }

    #[must_use]
    pub fn with_block(mut self, block: BlockArity) -> Self {
        self.block = block;
        self
    }

    pub fn min_arity(&self) -> usize {
        self.required
    }

    /// `None` when a rest type makes the arity unbounded.
    pub fn max_arity(&self) -> Option<usize> {
        match self.rest {
            Some(_) => None,
            None => Some(self.parameters.len()),
        }
    }

    pub fn accepts_count(&self, count: usize) -> bool {
        count >= self.required && self.max_arity().map_or(true, |max| count <= max)
    }

    pub fn block(&self) -> BlockArity {
        self.block
    }

    /// Type expected at argument `index`.
    pub fn slot_type(&self, index: usize) -> Option<&Type> {
        self.parameters.get(index).or(self.rest.as_ref())
    }

    /// Index of the first argument whose value is not an instance of its
    /// slot type, or `None` when all arguments fit.
    pub fn first_rejected<'v>(&self, values: impl IntoIterator<Item = &'v Value>) -> Option<usize> {
        values.into_iter().enumerate().find_map(|(index, value)| {
            let fits = self.slot_type(index).is_some_and(|ty| ty.is_instance(value));
            (!fits).then_some(index)
        })
    }
}
