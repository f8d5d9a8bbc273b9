//! Signature-based multiple dispatch.
//!
//! Every operator and function call goes through a [`Descriptor`]: an
//! ordered list of (signature, callback) candidates. A call is resolved in
//! three stages, each narrowing the candidates left by the previous one:
//!
//! 1. arity: the argument count must fall in the signature's range
//! 2. block: a block must be supplied when required, absent when not
//!    accepted, and have an acceptable parameter count
//! 3. types: every argument must be an instance of its slot type
//!
//! The first surviving candidate in registration order is invoked with the
//! [`CallContext`]; its result is returned unchanged.

mod call_context;
mod descriptor;
mod signature;

pub use call_context::{Argument, Arguments, Block, CallContext};
pub use descriptor::{Callback, Descriptor, DispatchEntry};
pub use signature::{BlockArity, Signature};
