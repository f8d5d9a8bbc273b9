use super::*;
use crate::catalog::{MemoryCatalog, ResourceKey};
use crate::errors::evaluation_failure;
use mar_ir::{ClassStatement, DefinedTypeStatement, Expr, FunctionStatement, Parameter, Stmt};
use pretty_assertions::assert_eq;

fn path() -> Arc<str> {
    Arc::from("site.pp")
}

fn loc(line: u32) -> Location {
    Location::new(path(), Position::line(line))
}

fn settings() -> EvalSettings {
    EvalSettings::default().deduplicate(false)
}

fn notice(text: &str) -> Stmt {
    Stmt::Expr(Expr::call("notice", vec![Expr::string(text)]))
}

fn assign(name: &str, value: Expr) -> Stmt {
    Stmt::Expr(Expr::assign(name, value))
}

fn define(context: &mut EvaluationContext<'_>, statement: ClassStatement) {
    let name = ClassName::new(statement.name.as_str());
    let conflict = context
        .define_class(name, Arc::new(statement), path())
        .unwrap();
    assert!(conflict.is_none());
}

fn notices(context: &EvaluationContext<'_>) -> Vec<String> {
    context
        .diagnostics()
        .diagnostics()
        .iter()
        .filter(|d| d.severity == Severity::Notice)
        .map(|d| d.message.clone())
        .collect()
}

fn errors(context: &EvaluationContext<'_>) -> Vec<String> {
    context
        .diagnostics()
        .diagnostics()
        .iter()
        .filter(|d| d.is_error())
        .map(|d| d.message.clone())
        .collect()
}

fn local(context: &EvaluationContext<'_>, scope: &str, name: &str) -> Option<Value> {
    let id = context.find_scope(scope)?;
    context.scope(id).local(name).map(|v| v.value.clone())
}

// Scope stack

#[test]
fn test_pop_refuses_top_scope() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    assert_eq!(context.scope_depth(), 1);
    assert!(!context.pop_scope());
    assert_eq!(context.current_scope(), ScopeId::TOP);
}

#[test]
fn test_guard_restores_scope_after_error() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    let web = context.add_scope("web", "Class[Web]", Some(ScopeId::TOP));

    let result: Result<(), EvalError> = context.with_scope(web, |scoped| {
        assert_eq!(scoped.current_scope(), web);
        scoped.with_scope(ScopeId::TOP, |inner| {
            assert_eq!(inner.scope_depth(), 3);
            Err(evaluation_failure("boom"))
        })
    });

    assert!(result.is_err());
    assert_eq!(context.scope_depth(), 1);
    assert_eq!(context.current_scope(), ScopeId::TOP);
}

#[test]
fn test_guard_restores_scope_after_panic() {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    let web = context.add_scope("web", "Class[Web]", Some(ScopeId::TOP));

    let result = catch_unwind(AssertUnwindSafe(|| {
        let scoped = context.scoped(web);
        assert_eq!(scoped.scope_depth(), 2);
        panic!("test panic");
    }));

    assert!(result.is_err());
    assert_eq!(context.scope_depth(), 1);
}

#[test]
fn test_ephemeral_scope_is_released() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    let before = context.scopes().len();

    context
        .with_ephemeral_scope("lambda", ScopeId::TOP, |scoped| {
            let scope = scoped.current_scope();
            assert_eq!(scoped.scope(scope).parent(), Some(ScopeId::TOP));
            scoped.set_variable("x", Value::Integer(1), loc(1))
        })
        .unwrap();

    assert_eq!(context.scopes().len(), before);
    assert!(context.find_variable("x").is_none());
}

// Variables

#[test]
fn test_qualified_lookups() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    let web = context.add_scope("web", "Class[Web]", Some(ScopeId::TOP));
    context.set_variable("site", Value::string("dc1"), loc(1)).unwrap();
    context
        .set_variable_in(web, "port", Value::Integer(80), loc(2))
        .unwrap();

    let at = loc(9);
    assert_eq!(context.lookup_variable("::site", &at).unwrap(), Value::string("dc1"));
    assert_eq!(context.lookup_variable("web::port", &at).unwrap(), Value::Integer(80));
    assert_eq!(context.lookup_variable("::Web::port", &at).unwrap(), Value::Integer(80));
    assert_eq!(context.lookup_variable("port", &at).unwrap(), Value::Undef);

    context.with_scope(web, |scoped| {
        assert_eq!(scoped.lookup_variable("port", &at).unwrap(), Value::Integer(80));
        assert_eq!(scoped.lookup_variable("site", &at).unwrap(), Value::string("dc1"));
    });
}

#[test]
fn test_strict_variables() {
    let mut catalog = MemoryCatalog::new();
    let context = EvaluationContext::new(&mut catalog, settings().strict_variables(true));
    let error = context.lookup_variable("missing", &loc(4)).unwrap_err();
    assert_eq!(
        error.kind,
        EvalErrorKind::UndefinedVariable {
            name: "missing".into()
        }
    );
    assert_eq!(error.location, Some(loc(4)));
}

// Definitions

#[test]
fn test_conflicting_parent_returns_first_definition() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    define(&mut context, ClassStatement::new("web").with_parent("a").at(1));

    let second = Arc::new(ClassStatement::new("web").with_parent("b").at(7));
    let conflict = context
        .define_class(ClassName::new("web"), second, path())
        .unwrap()
        .cloned();
    let existing = conflict.unwrap();
    assert_eq!(existing.parent(), Some(&ClassName::new("a")));
    assert_eq!(existing.line(), 1);
    assert_eq!(context.class_definitions(&ClassName::new("web")).len(), 1);
}

#[test]
fn test_matching_or_absent_parent_is_accepted() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    define(&mut context, ClassStatement::new("web").with_parent("a").at(1));
    define(&mut context, ClassStatement::new("web").at(2));
    define(&mut context, ClassStatement::new("Web").with_parent("A").at(3));
    assert_eq!(context.class_definitions(&ClassName::new("web")).len(), 3);
}

#[test]
fn test_reserved_parameters_rejected_at_definition() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());

    for reserved in ["title", "name"] {
        let statement = ClassStatement::new("web")
            .with_parameters(vec![Parameter::new(reserved).at(4)])
            .at(3);
        let error = context
            .define_class(ClassName::new("web"), Arc::new(statement), path())
            .unwrap_err();
        assert_eq!(
            error.kind,
            EvalErrorKind::ReservedParameterName {
                parameter: reserved.into()
            }
        );
        assert_eq!(error.location, Some(loc(4)));
    }

    let rest = ClassStatement::new("web").with_parameters(vec![Parameter::new("all").rest()]);
    let error = context
        .define_class(ClassName::new("web"), Arc::new(rest), path())
        .unwrap_err();
    assert_eq!(
        error.kind,
        EvalErrorKind::InvalidRestParameter {
            owner: "class".into(),
            parameter: "all".into()
        }
    );
    assert!(!context.is_class_defined(&ClassName::new("web")));
}

#[test]
fn test_defined_type_parameters_validated() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());

    let rest = DefinedTypeStatement::new("vhost", vec![Parameter::new("all").rest()], vec![]);
    let error = context.define_type("vhost", Arc::new(rest), path()).unwrap_err();
    assert_eq!(
        error.kind,
        EvalErrorKind::InvalidRestParameter {
            owner: "defined type".into(),
            parameter: "all".into()
        }
    );

    let ok = DefinedTypeStatement::new("vhost", vec![Parameter::new("port")], vec![]).at(2);
    context.define_type("vhost", Arc::new(ok.clone()), path()).unwrap();
    let error = context.define_type("::Vhost", Arc::new(ok.at(9)), path()).unwrap_err();
    assert_eq!(
        error.kind,
        EvalErrorKind::DuplicateDefinedType {
            name: "vhost".into(),
            previous: loc(2)
        }
    );
}

#[test]
fn test_register_definitions_names_nested_classes() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    let statements = vec![
        Stmt::class(ClassStatement::new("apache").with_body(vec![
            Stmt::class(ClassStatement::new("vhost")),
            Stmt::class(ClassStatement::new("::standalone")),
            Stmt::defined_type(DefinedTypeStatement::new("site", vec![], vec![])),
        ])),
        Stmt::function(FunctionStatement::new("greet", vec![], vec![])),
    ];
    context.register_definitions(&statements, &path(), None).unwrap();

    for name in ["apache", "apache::vhost", "standalone"] {
        assert!(context.is_class_defined(&ClassName::new(name)), "{name}");
    }
    assert!(!context.is_class_defined(&ClassName::new("vhost")));
    assert!(context.defined_type("Apache::Site").is_some());
    assert!(context.defined_type("site").is_none());
    assert!(context.functions().is_defined("greet"));
}

#[test]
fn test_register_definitions_reports_conflict() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    let statements = vec![
        Stmt::class(ClassStatement::new("web").with_parent("a").at(1)),
        Stmt::class(ClassStatement::new("web").with_parent("b").at(5)),
    ];
    let error = context
        .register_definitions(&statements, &path(), None)
        .unwrap_err();
    assert_eq!(
        error.kind,
        EvalErrorKind::ConflictingClassDefinition {
            class: "web".into(),
            parent: "b".into(),
            existing_parent: "a".into(),
            existing: loc(1),
        }
    );
    assert_eq!(error.location, Some(loc(5)));
}

#[test]
fn test_builtin_function_cannot_be_redefined() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    let statements = vec![Stmt::function(FunctionStatement::new("notice", vec![], vec![]))];
    let error = context
        .register_definitions(&statements, &path(), None)
        .unwrap_err();
    assert!(matches!(error.kind, EvalErrorKind::DuplicateFunction { ref name, .. } if name == "notice"));
}

// Declaration

#[test]
fn test_declare_class_evaluates_once() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    define(
        &mut context,
        ClassStatement::new("base").with_body(vec![notice("base body")]),
    );
    let name = ClassName::new("base");

    assert!(!context.is_class_declared(&name));
    let first = context.declare_class(&name, &loc(10), None).unwrap();
    let second = context.declare_class(&name, &loc(11), None).unwrap();

    assert_eq!(first, second);
    assert!(context.is_class_declared(&name));
    assert_eq!(notices(&context), vec!["base body".to_string()]);
    drop(context);

    let resource = catalog.get(&ResourceKey::class("base")).unwrap();
    assert_eq!(resource.location, loc(10));
}

#[test]
fn test_every_definition_evaluated_in_shared_scope() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    define(
        &mut context,
        ClassStatement::new("base").with_body(vec![
            notice("base"),
            assign("from_base", Expr::string("b")),
        ]),
    );
    define(
        &mut context,
        ClassStatement::new("k").with_body(vec![notice("first"), assign("x", Expr::integer(1))]),
    );
    define(
        &mut context,
        ClassStatement::new("k").with_parent("base").with_body(vec![
            notice("second"),
            assign("y", Expr::variable("x")),
            assign("z", Expr::variable("from_base")),
        ]),
    );

    let name = ClassName::new("k");
    context.declare_class(&name, &loc(1), None).unwrap();

    assert_eq!(
        notices(&context),
        vec!["base".to_string(), "first".to_string(), "second".to_string()]
    );
    assert!(context
        .class_definitions(&name)
        .iter()
        .all(ClassDefinition::is_evaluated));
    let base = context.find_scope("base").unwrap();
    let k = context.find_scope("k").unwrap();
    assert_eq!(context.scope(k).parent(), Some(base));
    assert_eq!(local(&context, "k", "title"), Some(Value::string("k")));
    assert_eq!(local(&context, "k", "name"), Some(Value::string("k")));
    assert_eq!(local(&context, "k", "y"), Some(Value::Integer(1)));
    assert_eq!(local(&context, "k", "z"), Some(Value::string("b")));
}

#[test]
fn test_parent_evaluated_before_child() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    define(
        &mut context,
        ClassStatement::new("base").with_body(vec![
            notice("base"),
            assign("from_base", Expr::integer(1)),
        ]),
    );
    define(
        &mut context,
        ClassStatement::new("derived").with_parent("base").with_body(vec![
            notice("derived"),
            assign("seen", Expr::variable("from_base")),
        ]),
    );

    context
        .declare_class(&ClassName::new("derived"), &loc(1), None)
        .unwrap();

    assert_eq!(notices(&context), vec!["base".to_string(), "derived".to_string()]);
    let base = context.find_scope("base").unwrap();
    let derived = context.find_scope("derived").unwrap();
    assert!(base.index() < derived.index());
    assert_eq!(context.scope(base).parent(), Some(ScopeId::TOP));
    assert_eq!(context.scope(derived).parent(), Some(base));
    assert_eq!(local(&context, "derived", "seen"), Some(Value::Integer(1)));
    assert!(context.is_class_declared(&ClassName::new("base")));
}

#[test]
fn test_title_name_and_keywords_bound() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    define(
        &mut context,
        ClassStatement::new("web").with_parameters(vec![
            Parameter::new("port").with_default(Expr::integer(80)),
            Parameter::new("docroot").with_default(Expr::string("/var/www")),
        ]),
    );

    let keywords = vec![
        ("port".to_string(), Value::Integer(8080)),
        ("name".to_string(), Value::string("www")),
    ];
    context
        .declare_class(&ClassName::new("web"), &loc(1), Some(&keywords))
        .unwrap();

    assert_eq!(local(&context, "web", "title"), Some(Value::string("web")));
    assert_eq!(local(&context, "web", "name"), Some(Value::string("www")));
    assert_eq!(local(&context, "web", "port"), Some(Value::Integer(8080)));
    assert_eq!(local(&context, "web", "docroot"), Some(Value::string("/var/www")));
}

#[test]
fn test_unknown_keyword_fails_class() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    define(
        &mut context,
        ClassStatement::new("web").with_parameters(vec![Parameter::new("port")]),
    );

    let keywords = vec![("bogus".to_string(), Value::Integer(1))];
    let error = context
        .declare_class(&ClassName::new("web"), &loc(1), Some(&keywords))
        .unwrap_err();

    assert!(error.is_reported());
    assert_eq!(
        error.kind,
        EvalErrorKind::ClassEvaluationFailed {
            class: "Class[Web]".into()
        }
    );
    assert_eq!(
        errors(&context),
        vec!["'bogus' is not a valid parameter for Class[Web].".to_string()]
    );
    assert!(context.find_scope("web").is_none());
}

#[test]
fn test_undefined_base_class() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    define(&mut context, ClassStatement::new("derived").with_parent("missing").at(2));

    let error = context
        .declare_class(&ClassName::new("derived"), &loc(1), None)
        .unwrap_err();
    assert!(error.is_reported());
    assert_eq!(
        errors(&context),
        vec!["base class 'missing' has not been defined.".to_string()]
    );
    let diagnostic = &context.diagnostics().diagnostics()[0];
    assert_eq!(diagnostic.location, Some(loc(2)));
    assert_eq!(diagnostic.notes, vec!["while evaluating Class[Derived]".to_string()]);
    assert!(context.find_scope("derived").is_none());
}

#[test]
fn test_cyclic_hierarchy_detected() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    define(&mut context, ClassStatement::new("a").with_parent("b"));
    define(&mut context, ClassStatement::new("b").with_parent("a"));

    let error = context
        .declare_class(&ClassName::new("a"), &loc(1), None)
        .unwrap_err();
    assert!(error.is_reported());
    assert_eq!(
        errors(&context),
        vec!["cyclic class hierarchy: Class[A] -> Class[B] -> Class[A].".to_string()]
    );
}

#[test]
fn test_self_inheritance_detected() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    define(&mut context, ClassStatement::new("a").with_parent("a"));

    context
        .declare_class(&ClassName::new("a"), &loc(1), None)
        .unwrap_err();
    assert_eq!(
        errors(&context),
        vec!["cyclic class hierarchy: Class[A] -> Class[A].".to_string()]
    );
}

#[test]
fn test_parent_including_pending_child_is_a_cycle() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    define(
        &mut context,
        ClassStatement::new("a")
            .with_parent("b")
            .with_body(vec![assign("x", Expr::integer(1))]),
    );
    define(
        &mut context,
        ClassStatement::new("b").with_body(vec![
            Stmt::Expr(Expr::call("include", vec![Expr::string("a")]).at(5)),
            Stmt::Expr(Expr::call("notice", vec![Expr::variable("a::x")])),
        ]),
    );

    let error = context
        .declare_class(&ClassName::new("a"), &loc(1), None)
        .unwrap_err();
    assert!(error.is_reported());
    assert_eq!(
        errors(&context),
        vec!["cyclic class hierarchy: Class[A] -> Class[B] -> Class[A].".to_string()]
    );
    let diagnostic = &context.diagnostics().diagnostics()[0];
    assert_eq!(diagnostic.location, Some(loc(5)));
    assert_eq!(diagnostic.notes, vec!["while evaluating Class[B]".to_string()]);
    assert!(notices(&context).is_empty());
}

#[test]
fn test_body_including_itself_is_idempotent() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    define(
        &mut context,
        ClassStatement::new("a").with_body(vec![
            Stmt::Expr(Expr::call("include", vec![Expr::string("a")])),
            notice("a body"),
        ]),
    );

    context
        .declare_class(&ClassName::new("a"), &loc(1), None)
        .unwrap();
    assert_eq!(notices(&context), vec!["a body".to_string()]);
}

#[test]
fn test_body_failure_is_contained_and_logged_once() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    define(
        &mut context,
        ClassStatement::new("broken").with_body(vec![Stmt::Expr(
            Expr::call("fail", vec![Expr::string("broken")]).at(5),
        )]),
    );
    define(
        &mut context,
        ClassStatement::new("child").with_parent("broken"),
    );

    let error = context
        .declare_class(&ClassName::new("child"), &loc(1), None)
        .unwrap_err();
    assert_eq!(
        error.kind,
        EvalErrorKind::ClassEvaluationFailed {
            class: "Class[Child]".into()
        }
    );
    assert!(error.is_reported());
    assert_eq!(errors(&context), vec!["broken".to_string()]);
    assert_eq!(context.diagnostics().diagnostics()[0].location, Some(loc(5)));
    assert!(!context.is_class_declared(&ClassName::new("broken")));
    assert_eq!(context.scope_depth(), 1);
}

#[test]
fn test_undefined_class() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    let error = context
        .declare_class(&ClassName::new("nope"), &loc(3), None)
        .unwrap_err();
    assert_eq!(
        error.kind,
        EvalErrorKind::UndefinedClass {
            class: "nope".into()
        }
    );
    assert!(!error.is_reported());
}

#[test]
fn test_report_does_not_duplicate() {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings());
    let error = evaluation_failure("once").at(loc(1));
    let guarantee = context.report(&error);
    let reported = error.reported(guarantee);
    context.report(&reported);
    assert_eq!(errors(&context), vec!["once".to_string()]);
}
