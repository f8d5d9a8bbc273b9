//! Evaluation errors.
//!
//! Every failure in the evaluator is an [`EvalError`]: a typed
//! [`EvalErrorKind`], the location it happened at, and, once it has been
//! written to the diagnostic queue, the proof that it was reported.
//! Boundaries that log errors check [`EvalError::is_reported`] so nothing
//! is reported twice.

use std::fmt;

use mar_diagnostic::{Diagnostic, ErrorCode, ErrorGuaranteed};
use mar_ir::Location;
use mar_types::Value;

/// Result of evaluating an expression.
pub type EvalResult = Result<Value, EvalError>;

/// What went wrong.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalErrorKind {
    // Dispatch
    #[error("'{name}' expects {expected} but was given {actual}.")]
    ArityMismatch {
        name: String,
        expected: String,
        actual: usize,
    },
    #[error("'{name}' {reason}.")]
    BlockArityMismatch { name: String, reason: String },
    #[error(
        "'{name}' expects {expected} for argument {} but was given {actual}.",
        .slot + 1
    )]
    TypeMismatch {
        name: String,
        /// Zero-based index of the rejecting argument.
        slot: usize,
        expected: String,
        actual: String,
    },

    // Parameters
    #[error("'{parameter}' is not a valid parameter for {owner}.")]
    UnknownParameter { owner: String, parameter: String },
    #[error("parameter ${parameter} is reserved and cannot be used.")]
    ReservedParameterName { parameter: String },
    #[error("{owner} parameter ${parameter} cannot \"captures rest\".")]
    InvalidRestParameter { owner: String, parameter: String },
    #[error("parameter ${parameter} of {owner} expects {expected} but was given {actual}.")]
    ParameterTypeMismatch {
        owner: String,
        parameter: String,
        expected: String,
        actual: String,
    },
    #[error("{owner} expects a value for parameter ${parameter}.")]
    MissingParameter { owner: String, parameter: String },

    // Classes
    #[error("base class '{parent}' has not been defined.")]
    UndefinedBaseClass { class: String, parent: String },
    #[error(
        "class '{class}' cannot inherit from '{parent}' because it was previously \
         defined to inherit from '{existing_parent}' at {existing}."
    )]
    ConflictingClassDefinition {
        class: String,
        parent: String,
        existing_parent: String,
        existing: Location,
    },
    #[error("cyclic class hierarchy: {cycle}.")]
    CyclicClassHierarchy { cycle: String },
    #[error("could not find class '{class}'.")]
    UndefinedClass { class: String },
    #[error("failed to evaluate {class}.")]
    ClassEvaluationFailed { class: String },

    // Variables
    #[error("cannot assign to variable ${name}: it was previously assigned at {previous}.")]
    ReassignedVariable { name: String, previous: Location },
    #[error("cannot assign to ${name}: the variable name is reserved.")]
    ReservedVariableName { name: String },
    #[error("undefined variable ${name}.")]
    UndefinedVariable { name: String },

    // Evaluation
    #[error("{message}")]
    EvaluationFailure { message: String },
    #[error("unknown function '{name}'.")]
    UndefinedFunction { name: String },
    #[error("function '{name}' was previously defined at {previous}.")]
    DuplicateFunction { name: String, previous: Location },
    #[error("defined type '{name}' was previously defined at {previous}.")]
    DuplicateDefinedType { name: String, previous: Location },
    #[error("resource {resource} was previously declared at {previous}.")]
    DuplicateResource { resource: String, previous: Location },
    #[error("cannot divide by zero.")]
    DivisionByZero,
    #[error("integer overflow in '{operation}'.")]
    ArithmeticOverflow { operation: String },
    #[error("invalid regular expression /{pattern}/: {reason}")]
    InvalidRegex { pattern: String, reason: String },
    #[error("unknown type '{name}'.")]
    UnknownType { name: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl EvalErrorKind {
    /// Stable error code for diagnostics.
    pub fn code(&self) -> ErrorCode {
        match self {
            EvalErrorKind::ArityMismatch { .. } => ErrorCode::E6001,
            EvalErrorKind::BlockArityMismatch { .. } => ErrorCode::E6002,
            EvalErrorKind::TypeMismatch { .. } => ErrorCode::E6003,
            EvalErrorKind::UnknownParameter { .. } => ErrorCode::E6004,
            EvalErrorKind::ReservedParameterName { .. } => ErrorCode::E6005,
            EvalErrorKind::InvalidRestParameter { .. } => ErrorCode::E6006,
            EvalErrorKind::UndefinedBaseClass { .. } => ErrorCode::E6007,
            EvalErrorKind::ConflictingClassDefinition { .. } => ErrorCode::E6008,
            EvalErrorKind::ReassignedVariable { .. } => ErrorCode::E6009,
            EvalErrorKind::EvaluationFailure { .. } => ErrorCode::E6010,
            EvalErrorKind::CyclicClassHierarchy { .. } => ErrorCode::E6011,
            EvalErrorKind::UndefinedClass { .. } => ErrorCode::E6012,
            EvalErrorKind::UndefinedFunction { .. } => ErrorCode::E6013,
            EvalErrorKind::UndefinedVariable { .. } => ErrorCode::E6014,
            EvalErrorKind::DuplicateFunction { .. } => ErrorCode::E6015,
            EvalErrorKind::DuplicateResource { .. } => ErrorCode::E6016,
            EvalErrorKind::ClassEvaluationFailed { .. } => ErrorCode::E6017,
            EvalErrorKind::ReservedVariableName { .. } => ErrorCode::E6018,
            EvalErrorKind::DivisionByZero => ErrorCode::E6019,
            EvalErrorKind::ArithmeticOverflow { .. } => ErrorCode::E6020,
            EvalErrorKind::InvalidRegex { .. } => ErrorCode::E6021,
            EvalErrorKind::UnknownType { .. } => ErrorCode::E6022,
            EvalErrorKind::ParameterTypeMismatch { .. } => ErrorCode::E6023,
            EvalErrorKind::MissingParameter { .. } => ErrorCode::E6024,
            EvalErrorKind::DuplicateDefinedType { .. } => ErrorCode::E6025,
            EvalErrorKind::Internal { .. } => ErrorCode::E9001,
        }
    }

    /// Whether this kind comes out of overload resolution.
    pub fn is_dispatch_error(&self) -> bool {
        matches!(
            self,
            EvalErrorKind::ArityMismatch { .. }
                | EvalErrorKind::BlockArityMismatch { .. }
                | EvalErrorKind::TypeMismatch { .. }
        )
    }
}

/// An evaluation error with its source location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub location: Option<Location>,
    reported: Option<ErrorGuaranteed>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind) -> Self {
        EvalError {
            kind,
            location: None,
            reported: None,
        }
    }

    /// Attach a location unless a more precise one is already set.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        if self.location.is_none() {
            self.location = Some(location);
        }
        self
    }

    /// Mark the error as already written to the diagnostic queue.
    #[must_use]
    pub fn reported(mut self, guarantee: ErrorGuaranteed) -> Self {
        self.reported = Some(guarantee);
        self
    }

    pub fn is_reported(&self) -> bool {
        self.reported.is_some()
    }

    pub fn guarantee(&self) -> Option<ErrorGuaranteed> {
        self.reported
    }

    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }

    /// Convert into a diagnostic for the queue.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.code()).with_message(self.kind.to_string());
        match &self.location {
            Some(location) => diagnostic.with_location(location.clone()),
            None => diagnostic,
        }
    }
}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        EvalError::new(kind)
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} at {location}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

// Constructors for the common cases.

pub fn internal(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::Internal {
        message: message.into(),
    })
}

pub fn evaluation_failure(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::EvaluationFailure {
        message: message.into(),
    })
}

pub fn arithmetic_overflow(operation: &str) -> EvalError {
    EvalError::new(EvalErrorKind::ArithmeticOverflow {
        operation: operation.to_string(),
    })
}

pub fn division_by_zero() -> EvalError {
    EvalError::new(EvalErrorKind::DivisionByZero)
}

pub fn invalid_regex(pattern: &str, error: &regex::Error) -> EvalError {
    EvalError::new(EvalErrorKind::InvalidRegex {
        pattern: pattern.to_string(),
        reason: error.to_string(),
    })
}
