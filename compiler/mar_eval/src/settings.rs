//! Evaluation settings.
//!
//! Settings are plain data owned by each `EvaluationContext`. The driver
//! builds them with the builder methods or reads them from the environment:
//!
//! - `MAR_STRICT_VARIABLES`: `1`/`true` turns undefined variables into errors
//! - `MAR_ERROR_LIMIT`: maximum number of recorded errors (`0` = unlimited)

use mar_diagnostic::DiagnosticConfig;

/// Environment variable enabling strict variable lookup.
pub const STRICT_VARIABLES_VAR: &str = "MAR_STRICT_VARIABLES";
/// Environment variable overriding the diagnostic error limit.
pub const ERROR_LIMIT_VAR: &str = "MAR_ERROR_LIMIT";

/// Settings for one compilation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalSettings {
    /// Referencing an undefined variable is an error instead of `undef`.
    pub strict_variables: bool,
    pub diagnostics: DiagnosticConfig,
}

impl EvalSettings {
    pub fn new() -> Self {
        EvalSettings::default()
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`, falling back to defaults for
    /// missing or unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = EvalSettings::default();
        if let Some(value) = lookup(STRICT_VARIABLES_VAR) {
            settings.strict_variables = parse_flag(&value);
        }
        if let Some(limit) = lookup(ERROR_LIMIT_VAR).and_then(|v| v.trim().parse().ok()) {
            settings.diagnostics.error_limit = limit;
        }
        settings
    }

    #[must_use]
    pub fn strict_variables(mut self, strict: bool) -> Self {
        self.strict_variables = strict;
        self
    }

    #[must_use]
    pub fn error_limit(mut self, limit: usize) -> Self {
        self.diagnostics.error_limit = limit;
        self
    }

    #[must_use]
    pub fn deduplicate(mut self, deduplicate: bool) -> Self {
        self.diagnostics.deduplicate = deduplicate;
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests;
