use super::*;
use crate::catalog::MemoryCatalog;
use crate::scope::ScopeId;
use crate::settings::EvalSettings;
use mar_ir::{Expr, TypeArgument, TypeExpr};
use pretty_assertions::assert_eq;

fn lookup(context: &EvaluationContext<'_>, name: &str) -> Option<Value> {
    context.find_variable(name).map(|v| v.value.clone())
}

/// Bind `parameters` in a fresh scope and return the bound values in order.
fn bind(parameters: &[Parameter], bindings: Bindings<'_>) -> Result<Vec<Value>, EvalError> {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, EvalSettings::default());
    context.with_ephemeral_scope("test", ScopeId::TOP, |scoped| {
        Executor::new("function 'test'", parameters).bind(scoped, bindings)?;
        Ok(parameters
            .iter()
            .map(|p| lookup(scoped, p.name()).unwrap_or(Value::Undef))
            .collect())
    })
}

fn keywords(pairs: &[(&str, Value)]) -> Vec<(String, Value)> {
    pairs
        .iter()
        .map(|(name, value)| ((*name).to_string(), value.clone()))
        .collect()
}

#[test]
fn test_positional_binding() {
    let parameters = [Parameter::new("a"), Parameter::new("b")];
    let values = [Value::Integer(1), Value::string("two")];
    let bound = bind(&parameters, Bindings::Positional(&values)).unwrap();
    assert_eq!(bound, values.to_vec());
}

#[test]
fn test_rest_collects_remaining_arguments() {
    let parameters = [Parameter::new("first"), Parameter::new("rest").rest()];
    let values = [Value::Integer(1), Value::Integer(2), Value::Integer(3)];
    let bound = bind(&parameters, Bindings::Positional(&values)).unwrap();
    assert_eq!(
        bound,
        vec![
            Value::Integer(1),
            Value::array(vec![Value::Integer(2), Value::Integer(3)]),
        ]
    );

    let bound = bind(&parameters, Bindings::Positional(&values[..1])).unwrap();
    assert_eq!(bound[1], Value::array(Vec::new()));
}

#[test]
fn test_default_sees_earlier_parameters() {
    let parameters = [
        Parameter::new("port"),
        Parameter::new("listen").with_default(Expr::variable("port")),
    ];
    let values = [Value::Integer(8080)];
    let bound = bind(&parameters, Bindings::Positional(&values)).unwrap();
    assert_eq!(bound, vec![Value::Integer(8080), Value::Integer(8080)]);
}

#[test]
fn test_explicit_undef_keyword_selects_default() {
    let parameters = [
        Parameter::new("ensure").with_default(Expr::string("present")),
        Parameter::new("owner"),
    ];
    let supplied = keywords(&[("ensure", Value::Undef), ("owner", Value::Undef)]);
    let bound = bind(&parameters, Bindings::Keywords(&supplied)).unwrap();
    assert_eq!(bound, vec![Value::string("present"), Value::Undef]);
}

#[test]
fn test_missing_untyped_parameter() {
    let parameters = [Parameter::new("port").at(3)];
    let error = bind(&parameters, Bindings::Keywords(&[])).unwrap_err();
    assert_eq!(
        error.kind,
        EvalErrorKind::MissingParameter {
            owner: "function 'test'".into(),
            parameter: "port".into()
        }
    );
    assert_eq!(error.location.map(|l| l.line()), Some(3));
}

#[test]
fn test_missing_parameter_accepting_undef() {
    let optional = TypeExpr::new("Optional").of([TypeExpr::new("String")]);
    let parameters = [Parameter::new("comment").typed(optional)];
    let bound = bind(&parameters, Bindings::Keywords(&[])).unwrap();
    assert_eq!(bound, vec![Value::Undef]);

    let parameters = [Parameter::new("comment").typed(TypeExpr::new("String"))];
    let error = bind(&parameters, Bindings::Keywords(&[])).unwrap_err();
    assert!(matches!(error.kind, EvalErrorKind::MissingParameter { .. }));
}

#[test]
fn test_parameter_type_mismatch() {
    let bounded = TypeExpr::new("Integer")
        .with_argument(TypeArgument::Integer(1))
        .with_argument(TypeArgument::Integer(65535));
    let parameters = [Parameter::new("port").typed(bounded).at(7)];
    let values = [Value::Integer(70000)];
    let error = bind(&parameters, Bindings::Positional(&values)).unwrap_err();
    assert_eq!(
        error.kind,
        EvalErrorKind::ParameterTypeMismatch {
            owner: "function 'test'".into(),
            parameter: "port".into(),
            expected: "Integer[1, 65535]".into(),
            actual: "Integer".into(),
        }
    );
    assert_eq!(error.location.map(|l| l.line()), Some(7));
}

#[test]
fn test_rest_elements_are_type_checked() {
    let parameters = [Parameter::new("names")
        .typed(TypeExpr::new("String"))
        .rest()];
    let values = [Value::string("a"), Value::Integer(2)];
    let error = bind(&parameters, Bindings::Positional(&values)).unwrap_err();
    assert_eq!(
        error.kind,
        EvalErrorKind::ParameterTypeMismatch {
            owner: "function 'test'".into(),
            parameter: "names".into(),
            expected: "String".into(),
            actual: "Integer".into(),
        }
    );

    let values = [Value::string("a"), Value::string("b")];
    assert!(bind(&parameters, Bindings::Positional(&values)).is_ok());
}

#[test]
fn test_unknown_type_in_parameter() {
    let parameters = [Parameter::new("x").typed(TypeExpr::new("Strnig"))];
    let values = [Value::string("a")];
    let error = bind(&parameters, Bindings::Positional(&values)).unwrap_err();
    assert_eq!(
        error.kind,
        EvalErrorKind::UnknownType {
            name: "Strnig".into()
        }
    );
}

#[test]
fn test_validate_keywords() {
    let parameters = [Parameter::new("port")];
    let executor = Executor::new("Class[Web]", &parameters);

    let known = keywords(&[("port", Value::Integer(80))]);
    assert!(executor.validate_keywords(&known, false).is_ok());

    let name = keywords(&[("name", Value::string("www"))]);
    assert!(executor.validate_keywords(&name, true).is_ok());
    assert!(executor.validate_keywords(&name, false).is_err());

    let unknown = keywords(&[("port", Value::Integer(80)), ("bogus", Value::Undef)]);
    let error = executor.validate_keywords(&unknown, true).unwrap_err();
    assert_eq!(
        error.to_string(),
        "'bogus' is not a valid parameter for Class[Web]."
    );
}
