use super::*;
use mar_diagnostic::emitter::TextEmitter;
use mar_ir::{ClassStatement, Expr, Stmt};
use pretty_assertions::assert_eq;

fn tree(statements: Vec<Stmt>) -> SyntaxTree {
    SyntaxTree::new("site.pp", statements)
}

fn notice(text: &str) -> Stmt {
    Stmt::Expr(Expr::call("notice", vec![Expr::string(text)]))
}

#[test]
fn test_empty_manifest_has_main_class() {
    let output = compile(&tree(Vec::new()), &EvalSettings::default());
    assert!(output.is_success());
    assert_eq!(output.exit_code(), 0);
    let keys: Vec<String> = output.catalog.iter().map(|r| r.key.to_string()).collect();
    assert_eq!(keys, vec!["Class[Main]".to_string()]);
}

#[test]
fn test_class_declared_before_it_is_written() {
    let output = compile(
        &tree(vec![
            Stmt::Expr(Expr::call("include", vec![Expr::string("late")])),
            Stmt::class(ClassStatement::new("late").with_body(vec![notice("late body")])),
        ]),
        &EvalSettings::default(),
    );
    assert!(output.is_success());
    assert!(output.catalog.contains(&ResourceKey::class("late")));
    assert_eq!(output.diagnostics.diagnostics()[0].message, "late body");
}

#[test]
fn test_first_error_halts() {
    let output = compile(
        &tree(vec![
            notice("before"),
            Stmt::Expr(Expr::call("fail", vec![Expr::string("stop")]).at(2)),
            notice("after"),
        ]),
        &EvalSettings::default(),
    );
    assert_eq!(output.exit_code(), 1);
    let messages: Vec<&str> = output
        .diagnostics
        .diagnostics()
        .iter()
        .map(|d| d.message.as_str())
        .collect();
    assert_eq!(messages, vec!["before", "stop"]);
    assert_eq!(output.diagnostics.error_count(), 1);
}

#[test]
fn test_definition_error_halts_before_evaluation() {
    let output = compile(
        &tree(vec![
            notice("never"),
            Stmt::class(ClassStatement::new("web").with_parent("a").at(1)),
            Stmt::class(ClassStatement::new("web").with_parent("b").at(2)),
        ]),
        &EvalSettings::default(),
    );
    assert!(!output.is_success());
    let diagnostics = output.diagnostics.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.starts_with("class 'web' cannot inherit from 'b'"));
}

#[test]
fn test_logged_errors_fail_compilation() {
    let output = compile(
        &tree(vec![
            Stmt::Expr(Expr::call("err", vec![Expr::string("soft")])),
            notice("still evaluated"),
        ]),
        &EvalSettings::default(),
    );
    assert!(matches!(output.status, CompileStatus::Failed(_)));
    assert_eq!(output.diagnostics.diagnostics().len(), 2);
}

#[test]
fn test_emit_writes_summary() {
    let output = compile(
        &tree(vec![Stmt::Expr(Expr::call("nope", vec![]).at(4))]),
        &EvalSettings::default(),
    );
    let mut emitter = TextEmitter::new(Vec::new());
    output.emit(&mut emitter).unwrap();
    let text = String::from_utf8(emitter.into_inner()).unwrap();
    assert!(text.contains("unknown function 'nope'."), "{text}");
    assert!(text.contains("site.pp:4"), "{text}");
    assert!(text.ends_with("compilation failed with 1 error\n"), "{text}");
}

#[test]
fn test_compile_all_preserves_order() {
    let trees: Vec<SyntaxTree> = (0..8)
        .map(|n| {
            let statements = if n % 3 == 0 {
                vec![Stmt::Expr(Expr::call("fail", vec![Expr::string("bad")]))]
            } else {
                vec![notice(&format!("manifest {n}"))]
            };
            SyntaxTree::new(format!("m{n}.pp"), statements)
        })
        .collect();

    let outputs = compile_all(&trees, &EvalSettings::default());
    assert_eq!(outputs.len(), trees.len());
    for (n, output) in outputs.iter().enumerate() {
        assert_eq!(&*output.path, format!("m{n}.pp"));
        assert_eq!(output.is_success(), n % 3 != 0);
    }
}
