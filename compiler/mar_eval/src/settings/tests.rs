use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_defaults() {
    let settings = EvalSettings::new();
    assert!(!settings.strict_variables);
    assert_eq!(settings.diagnostics, DiagnosticConfig::default());
}

#[test]
fn test_from_lookup() {
    let settings = EvalSettings::from_lookup(|name| match name {
        STRICT_VARIABLES_VAR => Some("TRUE".to_string()),
        ERROR_LIMIT_VAR => Some(" 3 ".to_string()),
        _ => None,
    });
    assert!(settings.strict_variables);
    assert_eq!(settings.diagnostics.error_limit, 3);
}

#[test]
fn test_from_lookup_ignores_garbage() {
    let settings = EvalSettings::from_lookup(|name| match name {
        STRICT_VARIABLES_VAR => Some("nope".to_string()),
        ERROR_LIMIT_VAR => Some("many".to_string()),
        _ => None,
    });
    assert_eq!(settings, EvalSettings::default());
}

#[test]
fn test_builder() {
    let settings = EvalSettings::new()
        .strict_variables(true)
        .error_limit(0)
        .deduplicate(false);
    assert!(settings.strict_variables);
    assert_eq!(settings.diagnostics, DiagnosticConfig::unlimited());
}
