//! Integration tests for error reporting

use pretty_assertions::assert_eq;
use quill::{run_with_config, run_with_console, BufferedConsole, ErrorCategory, ErrorKind, InterpreterConfig, QuillError};

fn run_err(source: &str) -> (QuillError, Vec<String>) {
    let mut console = BufferedConsole::new();
    let err = run_with_console(source, &mut console).expect_err("expected an error");
    (err, console.take_output())
}

fn category_of(source: &str) -> ErrorCategory {
    run_err(source).0.category()
}

fn main_body(body: &str) -> String {
    format!("(class main (field x 0) (method main () {}))", body)
}

#[test]
fn test_operator_type_errors() {
    for body in [
        "(print (+ 3 true))",
        "(print (& 1 2))",
        r#"(print (< "a" 1))"#,
        r#"(print (+ "a" "b"))"#,
        "(print (! 1))",
        "(print (== 1 null))",
    ] {
        let (err, out) = run_err(&main_body(body));
        assert_eq!(err.category(), ErrorCategory::Type, "{}", body);
        assert!(out.is_empty(), "{} printed {:?}", body, out);
    }
}

#[test]
fn test_error_aborts_remaining_statements() {
    let (err, out) = run_err(&main_body("(begin (print 1) (set x (+ x true)) (print 2))"));

    assert_eq!(err.category(), ErrorCategory::Type);
    assert_eq!(out, vec!["1"]);
}

#[test]
fn test_non_bool_conditions() {
    assert_eq!(category_of(&main_body("(if 0 (print 1))")), ErrorCategory::Type);
    assert_eq!(category_of(&main_body("(while null (print 1))")), ErrorCategory::Type);
}

#[test]
fn test_call_on_null_is_a_fault() {
    let (err, _) = run_err(r#"
        (class main
          (field other null)
          (method main () (call other foo)))
    "#);

    assert_eq!(err.kind, ErrorKind::NullDereference("foo".to_string()));
    assert_eq!(err.category(), ErrorCategory::Fault);
}

#[test]
fn test_call_on_non_object_is_a_type_error() {
    assert_eq!(category_of(&main_body("(call x foo)")), ErrorCategory::Type);
}

#[test]
fn test_field_default_order() {
    let (err, _) = run_err(r#"
        (class main
          (field b (+ a 5))
          (field a 10)
          (method main () (print b)))
    "#);

    assert_eq!(err.kind, ErrorKind::UndefinedVariable("a".to_string()));
    assert_eq!(err.category(), ErrorCategory::Name);
}

#[test]
fn test_unknown_names() {
    assert_eq!(category_of(&main_body("(print y)")), ErrorCategory::Name);
    assert_eq!(category_of(&main_body("(set y 1)")), ErrorCategory::Name);
    assert_eq!(category_of(&main_body("(call me missing)")), ErrorCategory::Name);
}

#[test]
fn test_missing_method_on_other_class() {
    let (err, _) = run_err(r#"
        (class thing)
        (class main
          (method main () (call (new thing) run)))
    "#);

    assert_eq!(
        err.kind,
        ErrorKind::UndefinedMethod { class: "thing".to_string(), method: "run".to_string() }
    );
}

#[test]
fn test_wrong_argument_count() {
    let (err, _) = run_err(r#"
        (class main
          (method add (a b) (return (+ a b)))
          (method main () (print (call me add 1))))
    "#);

    assert_eq!(
        err.kind,
        ErrorKind::WrongArity { method: "add".to_string(), expected: 2, got: 1 }
    );
    assert_eq!(err.category(), ErrorCategory::Type);
}

#[test]
fn test_new_unknown_class() {
    let (err, _) = run_err(&main_body("(set x (new ghost))"));

    assert_eq!(err.kind, ErrorKind::NewUnknownClass("ghost".to_string()));
    assert_eq!(err.category(), ErrorCategory::Type);
}

#[test]
fn test_duplicate_class() {
    let (err, _) = run_err(r#"
        (class main (method main () (print 1)))
        (class main (method main () (print 2)))
    "#);

    assert_eq!(err.kind, ErrorKind::DuplicateClass("main".to_string()));
    assert_eq!(err.category(), ErrorCategory::Type);
}

#[test]
fn test_duplicate_members() {
    assert_eq!(
        category_of("(class main (field a 1) (field a 2) (method main () (print a)))"),
        ErrorCategory::Name
    );
    assert_eq!(
        category_of("(class main (method main () (print 1)) (method main () (print 2)))"),
        ErrorCategory::Name
    );
}

#[test]
fn test_missing_entry_point() {
    let (err, _) = run_err("(class other (method main () (print 1)))");
    assert_eq!(err.kind, ErrorKind::UndefinedClass("main".to_string()));

    let source = "(class main (method start () (print 1)))";
    let (err, _) = run_err(source);
    assert_eq!(err.category(), ErrorCategory::Name);
    assert_eq!(
        err.with_source(source).to_string(),
        "name error: class 'main' has no method 'main'"
    );
}

#[test]
fn test_runaway_instantiation_points_at_new() {
    let source = "(class main\n  (field child (new main))\n  (method main () (print 1)))";
    let config = InterpreterConfig::default().with_max_call_depth(100);
    let err = run_with_config(source, BufferedConsole::new(), config).unwrap_err();

    assert_eq!(err.kind, ErrorKind::StackOverflow(100));
    assert_eq!(err.span.map(|span| span.line), Some(2));
}

#[test]
fn test_division_by_zero() {
    let (err, _) = run_err(&main_body("(print (/ 1 0))"));
    assert_eq!(err.kind, ErrorKind::DivisionByZero);
    assert_eq!(err.category(), ErrorCategory::Arithmetic);

    let (err, _) = run_err(&main_body("(print (% 1 x))"));
    assert_eq!(err.kind, ErrorKind::ModuloByZero);
}

#[test]
fn test_void_is_not_a_value_for_operators() {
    let (err, _) = run_err(r#"
        (class main
          (method nothing () (return))
          (method main () (print (== (call me nothing) 1))))
    "#);

    assert_eq!(err.category(), ErrorCategory::Type);
}

#[test]
fn test_printing_an_object_is_unsupported() {
    assert_eq!(category_of(&main_body("(print me)")), ErrorCategory::Unsupported);
    assert_eq!(category_of(&main_body("(print null)")), ErrorCategory::Unsupported);
}

#[test]
fn test_input_errors() {
    let mut console = BufferedConsole::with_input(["twelve"]);
    let err = run_with_console(&main_body("(inputi x)"), &mut console).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Type);

    let err = run_with_console(&main_body("(inputi x)"), BufferedConsole::new()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InputExhausted);
    assert_eq!(err.category(), ErrorCategory::Io);
}

#[test]
fn test_runaway_recursion_is_a_fault() {
    let config = InterpreterConfig::default().with_max_call_depth(200);
    let err = run_with_config(
        "(class main (method main () (call me main)))",
        BufferedConsole::new(),
        config,
    )
    .unwrap_err();

    assert_eq!(err.kind, ErrorKind::StackOverflow(200));
}

#[test]
fn test_syntax_errors() {
    for source in [
        "(class main (method main () (print 1))",
        "(class main (method main () (print \"open)))",
        "(class main (method main () (frobnicate 1)))",
        "(class main (method main () (print 1]))",
        "(class main (field if 1))",
    ] {
        let (err, _) = run_err(source);
        assert_eq!(err.category(), ErrorCategory::Syntax, "{}", source);
    }
}

#[test]
fn test_error_report_points_at_source() {
    let source = "(class main\n  (method main ()\n    (print (+ 1 true))))";
    let (err, _) = run_err(source);
    let report = err.with_source(source).to_string();

    assert!(report.starts_with("[line 3:"), "{}", report);
    assert!(report.contains("type error"), "{}", report);
    assert!(report.contains("(print (+ 1 true))"), "{}", report);
}
