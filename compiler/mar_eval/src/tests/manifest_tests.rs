//! A small site manifest evaluated end to end.

use std::sync::Arc;

use mar_diagnostic::Severity;
use mar_ir::{
    Attribute, BinaryOp, ClassStatement, DefinedTypeStatement, Expr, FunctionCall,
    FunctionStatement, Lambda, Parameter, Stmt, TypeExpr,
};
use mar_types::Value;
use pretty_assertions::assert_eq;

use crate::{EvalErrorKind, EvalSettings, EvaluationContext, MemoryCatalog, ResourceKey};

fn stmt(expr: Expr) -> Stmt {
    Stmt::Expr(expr)
}

fn var(name: &str) -> Expr {
    Expr::variable(name)
}

/// ```text
/// function port_of(Integer $base, Integer $offset = 0) { $base + $offset }
///
/// class apache(String $version = '2.4') {
///   package { 'httpd': ensure => $version }
///   define vhost(Integer $port) {
///     file { "/etc/httpd/${title}.conf": content => "listen ${port}" }
///   }
/// }
///
/// class apache::ssl inherits apache {
///   notice("ssl for ${version}")
/// }
///
/// include apache::ssl
/// ['www', 'api'].each |$i, $site| {
///   apache::vhost { $site: port => port_of(8000, $i) }
/// }
/// ```
fn site() -> Vec<Stmt> {
    let vhost = DefinedTypeStatement::new(
        "vhost",
        vec![Parameter::new("port").typed(TypeExpr::new("Integer"))],
        vec![stmt(Expr::resource(
            "file",
            Expr::interpolated(vec![
                Expr::string("/etc/httpd/"),
                var("title"),
                Expr::string(".conf"),
            ]),
            vec![Attribute::new(
                "content",
                Expr::interpolated(vec![Expr::string("listen "), var("port")]),
            )],
        ))],
    );
    let apache = ClassStatement::new("apache")
        .with_parameters(vec![Parameter::new("version")
            .typed(TypeExpr::new("String"))
            .with_default(Expr::string("2.4"))])
        .with_body(vec![
            stmt(Expr::resource(
                "package",
                Expr::string("httpd"),
                vec![Attribute::new("ensure", var("version"))],
            )),
            Stmt::defined_type(vhost),
        ])
        .at(3);
    let ssl = ClassStatement::new("apache::ssl")
        .with_parent("apache")
        .with_body(vec![stmt(Expr::call(
            "notice",
            vec![Expr::interpolated(vec![
                Expr::string("ssl for "),
                var("version"),
            ])],
        ))])
        .at(10);
    let port_of = FunctionStatement::new(
        "port_of",
        vec![
            Parameter::new("base").typed(TypeExpr::new("Integer")),
            Parameter::new("offset")
                .typed(TypeExpr::new("Integer"))
                .with_default(Expr::integer(0)),
        ],
        vec![stmt(Expr::binary(BinaryOp::Plus, var("base"), var("offset")))],
    );
    let declare_vhost = Lambda::new(
        vec![Parameter::new("i"), Parameter::new("site")],
        vec![stmt(Expr::resource(
            "apache::vhost",
            var("site"),
            vec![Attribute::new(
                "port",
                Expr::call("port_of", vec![Expr::integer(8000), var("i")]),
            )],
        ))],
    );

    vec![
        Stmt::function(port_of),
        Stmt::class(apache),
        Stmt::class(ssl),
        stmt(Expr::call("include", vec![Expr::string("apache::ssl")])),
        stmt(Expr::function_call(
            FunctionCall::new(
                "each",
                vec![Expr::array(vec![Expr::string("www"), Expr::string("api")])],
            )
            .with_lambda(declare_vhost),
        )),
    ]
}

#[test]
fn test_site_manifest() {
    let statements = site();
    let path: Arc<str> = Arc::from("site.pp");
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, EvalSettings::default());
    context
        .register_definitions(&statements, &path, None)
        .unwrap();
    context.evaluate_statements(&statements).unwrap();

    let notices: Vec<String> = context
        .diagnostics()
        .diagnostics()
        .iter()
        .filter(|d| d.severity == Severity::Notice)
        .map(|d| d.message.clone())
        .collect();
    assert_eq!(notices, vec!["ssl for 2.4".to_string()]);
    assert!(!context.diagnostics().has_errors());
    drop(context);

    let references: Vec<String> = catalog.iter().map(|r| r.key.to_string()).collect();
    assert_eq!(
        references,
        vec![
            "Class[Apache::Ssl]",
            "Class[Apache]",
            "Package[httpd]",
            "Apache::Vhost[www]",
            "File[/etc/httpd/www.conf]",
            "Apache::Vhost[api]",
            "File[/etc/httpd/api.conf]",
        ]
    );
    let api = catalog
        .get(&ResourceKey::new("file", "/etc/httpd/api.conf"))
        .unwrap();
    assert_eq!(api.parameter("content"), Some(&Value::string("listen 8001")));
    let vhost = catalog
        .get(&ResourceKey::new("apache::vhost", "www"))
        .unwrap();
    assert_eq!(vhost.parameter("port"), Some(&Value::Integer(8000)));
}

#[test]
fn test_type_error_in_defined_type_is_located() {
    let mut statements = site();
    statements.push(stmt(Expr::resource(
        "apache::vhost",
        Expr::string("bad").at(20),
        vec![Attribute::new("port", Expr::string("eighty"))],
    )));

    let path: Arc<str> = Arc::from("site.pp");
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, EvalSettings::default());
    context
        .register_definitions(&statements, &path, None)
        .unwrap();
    let error = context.evaluate_statements(&statements).unwrap_err();

    assert_eq!(
        error.kind,
        EvalErrorKind::ParameterTypeMismatch {
            owner: "Apache::Vhost[bad]".into(),
            parameter: "port".into(),
            expected: "Integer".into(),
            actual: "String".into(),
        }
    );
}
