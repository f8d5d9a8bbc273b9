//! Per-call argument access.

use mar_ir::{Expr, Lambda, Location, Position};
use mar_types::Value;
use smallvec::SmallVec;

use crate::errors::{internal, EvalError, EvalResult};
use crate::EvaluationContext;

/// An evaluated argument and where it was written.
#[derive(Clone, Debug, PartialEq)]
pub struct Argument {
    pub value: Value,
    pub position: Position,
}

impl Argument {
    pub fn new(value: Value, position: Position) -> Self {
        Argument { value, position }
    }
}

/// Arguments of one call; most calls have at most four.
pub type Arguments = SmallVec<[Argument; 4]>;

/// A block attached to a call. Never evaluated unless the callee yields.
#[derive(Copy, Clone, Debug)]
pub enum Block<'a> {
    /// `|$x| { ... }` attached to a function call.
    Lambda(&'a Lambda),
    /// Right operand of a short-circuit operator; takes no parameters.
    Deferred(&'a Expr),
}

impl Block<'_> {
    pub fn parameter_count(&self) -> usize {
        match self {
            Block::Lambda(lambda) => lambda.parameters.len(),
            Block::Deferred(_) => 0,
        }
    }
}

/// Everything a dispatch callback can see: the evaluated arguments, the
/// optional block, and the evaluation context.
pub struct CallContext<'a, 'c> {
    context: &'a mut EvaluationContext<'c>,
    name: &'a str,
    location: Location,
    arguments: Arguments,
    block: Option<Block<'a>>,
}

impl<'a, 'c> CallContext<'a, 'c> {
    pub fn new(
        context: &'a mut EvaluationContext<'c>,
        name: &'a str,
        location: Location,
        arguments: Arguments,
        block: Option<Block<'a>>,
    ) -> Self {
        CallContext {
            context,
            name,
            location,
            arguments,
            block,
        }
    }

    pub fn context(&mut self) -> &mut EvaluationContext<'c> {
        &mut *self.context
    }

    /// Name of the operator or function being called.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Location of the call.
    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    /// Argument values, cloned.
    pub fn values(&self) -> Vec<Value> {
        self.arguments.iter().map(|arg| arg.value.clone()).collect()
    }

    /// The argument at `index`.
    ///
    /// An out-of-range index means a callback disagrees with its own
    /// signature, so it is an internal error rather than a user error.
    pub fn argument(&self, index: usize) -> Result<&Value, EvalError> {
        self.arguments
            .get(index)
            .map(|arg| &arg.value)
            .ok_or_else(|| {
                internal(format!(
                    "argument {index} requested from '{}' called with {} arguments",
                    self.name,
                    self.arguments.len()
                ))
                .at(self.location.clone())
            })
    }

    /// Where argument `index` was written, falling back to the call site.
    pub fn argument_location(&self, index: usize) -> Location {
        match self.arguments.get(index) {
            Some(arg) if !arg.position.is_dummy() => {
                Location::new(self.location.path.clone(), arg.position)
            }
            _ => self.location.clone(),
        }
    }

    fn expect_binary(&self) -> Result<(), EvalError> {
        if self.arguments.len() == 2 {
            Ok(())
        } else {
            Err(internal(format!(
                "'{}' used as a binary operator with {} operands",
                self.name,
                self.arguments.len()
            ))
            .at(self.location.clone()))
        }
    }

    /// Left operand of a binary call.
    pub fn left(&self) -> Result<&Value, EvalError> {
        self.expect_binary()?;
        self.argument(0)
    }

    /// Right operand of a binary call.
    pub fn right(&self) -> Result<&Value, EvalError> {
        self.expect_binary()?;
        self.argument(1)
    }

    pub fn has_block(&self) -> bool {
        self.block.is_some()
    }

    pub fn block_parameter_count(&self) -> Option<usize> {
        self.block.as_ref().map(Block::parameter_count)
    }

    /// Evaluate the attached block with `arguments`.
    pub fn yield_block(&mut self, arguments: Vec<Value>) -> EvalResult {
        let Some(block) = self.block else {
            return Err(
                internal(format!("'{}' yielded without a block", self.name))
                    .at(self.location.clone()),
            );
        };
        self.context.call_block(block, arguments)
    }
}
