//! Error codes for evaluation diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E6003`) whose first digit
//! names the compiler phase.

use std::fmt;

/// Error codes for all evaluation diagnostics.
///
/// Format: E#### where the first digit indicates phase:
/// - E6xxx: Evaluation errors (dispatch, scopes, classes, resources)
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Dispatch
    /// Wrong number of arguments for every candidate
    E6001,
    /// Block missing, unexpected, or with the wrong parameter count
    E6002,
    /// Argument type not accepted by any candidate
    E6003,

    // Parameters
    /// Keyword argument names no declared parameter
    E6004,
    /// Parameter named `title` or `name`
    E6005,
    /// Class or defined-type parameter captures rest
    E6006,

    // Classes
    /// Parent class has not been defined
    E6007,
    /// Class redefined with a different parent
    E6008,
    /// Class inherits from itself, directly or indirectly
    E6011,
    /// Class has not been defined
    E6012,
    /// Class body failed to evaluate
    E6017,

    // Variables
    /// Variable assigned twice in one scope
    E6009,
    /// Variable is not defined (strict mode)
    E6014,
    /// Assignment to `$title` or `$name`
    E6018,
    /// Parameter value does not match its declared type
    E6023,
    /// Required parameter has no value
    E6024,

    // Evaluation
    /// Evaluation failed (e.g. `fail()`)
    E6010,
    /// Unknown function
    E6013,
    /// Function defined twice
    E6015,
    /// Resource declared twice
    E6016,
    /// Division or modulo by zero
    E6019,
    /// Integer arithmetic overflowed
    E6020,
    /// Regular expression failed to compile
    E6021,
    /// Type expression names no known type
    E6022,
    /// Defined type defined twice
    E6025,

    // Internal
    /// Internal evaluator error
    E9001,
}

impl ErrorCode {
    /// Every code, in numeric order.
    pub const ALL: [ErrorCode; 26] = [
        ErrorCode::E6001,
        ErrorCode::E6002,
        ErrorCode::E6003,
        ErrorCode::E6004,
        ErrorCode::E6005,
        ErrorCode::E6006,
        ErrorCode::E6007,
        ErrorCode::E6008,
        ErrorCode::E6009,
        ErrorCode::E6010,
        ErrorCode::E6011,
        ErrorCode::E6012,
        ErrorCode::E6013,
        ErrorCode::E6014,
        ErrorCode::E6015,
        ErrorCode::E6016,
        ErrorCode::E6017,
        ErrorCode::E6018,
        ErrorCode::E6019,
        ErrorCode::E6020,
        ErrorCode::E6021,
        ErrorCode::E6022,
        ErrorCode::E6023,
        ErrorCode::E6024,
        ErrorCode::E6025,
        ErrorCode::E9001,
    ];

    /// Get the string representation of this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E6001 => "E6001",
            ErrorCode::E6002 => "E6002",
            ErrorCode::E6003 => "E6003",
            ErrorCode::E6004 => "E6004",
            ErrorCode::E6005 => "E6005",
            ErrorCode::E6006 => "E6006",
            ErrorCode::E6007 => "E6007",
            ErrorCode::E6008 => "E6008",
            ErrorCode::E6009 => "E6009",
            ErrorCode::E6010 => "E6010",
            ErrorCode::E6011 => "E6011",
            ErrorCode::E6012 => "E6012",
            ErrorCode::E6013 => "E6013",
            ErrorCode::E6014 => "E6014",
            ErrorCode::E6015 => "E6015",
            ErrorCode::E6016 => "E6016",
            ErrorCode::E6017 => "E6017",
            ErrorCode::E6018 => "E6018",
            ErrorCode::E6019 => "E6019",
            ErrorCode::E6020 => "E6020",
            ErrorCode::E6021 => "E6021",
            ErrorCode::E6022 => "E6022",
            ErrorCode::E6023 => "E6023",
            ErrorCode::E6024 => "E6024",
            ErrorCode::E6025 => "E6025",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Check if this is an internal error rather than a manifest error.
    pub fn is_internal(&self) -> bool {
        matches!(self, ErrorCode::E9001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
