//! Runtime values and types for Marionette manifests.
//!
//! - [`Value`]: the tagged union every expression evaluates to
//! - [`Type`]: the runtime type model used by dispatch signatures,
//!   parameter type checks and type literals
//!
//! Dispatch relies on two predicates: [`Type::is_instance`] (does a value
//! fit a signature slot) and [`Type::is_assignable`] (is one type a
//! structural subtype of another).

mod types;
mod value;

pub use types::Type;
pub use value::{HashValue, Heap, Value};
