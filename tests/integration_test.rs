/**
End-to-end integration tests: source text → tokens → AST → check → run,
plus generated-source assertions for both backends.
*/
use hastack::codegen::{self, Target};
use hastack::interp::{Counts, eval};
use hastack::repl::Repl;
use hastack::typechecker::{TypeError, check_program};
use hastack::{Node, Parser, lex};
use std::rc::Rc;

fn parse(source: &str) -> Rc<Node> {
    Parser::new(lex("main.stk", source)).parse().expect("parses")
}

/// Check and interpret a whole program, returning its printed output.
fn run(source: &str) -> Vec<String> {
    let tree = parse(source);
    check_program(&tree).expect("program checks");
    let mut stack = Vec::new();
    let mut counts = Counts::default();
    let mut output = Vec::new();
    eval(&tree, &mut stack, &mut counts, &mut output).expect("program runs");
    assert!(stack.is_empty(), "checked programs drain the stack");
    output
}

#[test]
fn countdown_program_checks_and_runs() {
    assert_eq!(run("5 {. 0 = not} {1 -} while print"), vec!["0"]);
}

#[test]
fn macro_program_expands_and_runs() {
    assert_eq!(run("define double . + end 21 double print"), vec!["42"]);
}

#[test]
fn branching_picks_by_comparison() {
    assert_eq!(run("{'y'} {'n'} 1 2 < if print"), vec!["'y'"]);
    assert_eq!(run("{'y'} {'n'} 1 2 > if print"), vec!["'n'"]);
}

#[test]
fn list_building_round_trip() {
    assert_eq!(run("0 [1 2 3] <: print"), vec!["[0 1 2 3]"]);
}

#[test]
fn quotes_evaluate_against_the_live_stack() {
    assert_eq!(run("6 7 {*} ~ print"), vec!["42"]);
}

#[test]
fn residual_stack_is_rejected_with_its_location() {
    let err = check_program(&parse("42")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "main.stk:1:1: TYPE ERROR: Program finished with unhandled data on the stack"
    );
}

#[test]
fn kind_errors_point_at_the_operator() {
    let err = check_program(&parse("1 True +")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "main.stk:1:8: TYPE ERROR: Invalid type for the second argument of the '+' operator, expected 'Int', got 'Bool'"
    );
}

#[test]
fn congruence_errors_report_both_branches() {
    let err = check_program(&parse("{1} {True} True if print")).unwrap_err();
    match &err {
        TypeError::IncongruentBranches { sources, .. } => {
            assert!(sources.contains("'{1}'"));
            assert!(sources.contains("'{True}'"));
        }
        other => panic!("Expected IncongruentBranches, got {:?}", other),
    }
}

#[test]
fn both_backends_translate_the_same_program() {
    let tree = parse("5 {. 0 = not} {1 -} while print");
    check_program(&tree).expect("program checks");

    let c = codegen::generate(&tree, Target::C, "out");
    let c_main = &c[0].contents;
    assert!(c_main.contains("while_operation(stack);"));
    assert!(c_main.contains("void quote_0(Stack *stack) {"));
    assert!(c_main.contains("dup_operation(stack);"));

    let go = codegen::generate(&tree, Target::Go, "out");
    let go_main = &go[0].contents;
    assert!(go_main.contains("s.While()"));
    assert!(go_main.contains("func quote_0(s *Stack) {"));
    assert!(go_main.contains("s.Dup()"));
}

#[test]
fn repl_session_survives_errors_and_keeps_macros() {
    let mut repl = Repl::new();
    repl.eval_line("define double . + end");
    repl.eval_line("10 double");

    // A bad line resets the stacks but not the session or its macros.
    let lines = repl.eval_line("True +");
    assert!(lines[0].contains("TYPE ERROR"));

    let lines = repl.eval_line("21 double");
    assert!(lines.contains(&"42 : Int".to_string()));
    let lines = repl.eval_line("print");
    assert_eq!(lines[0], "42");
}

#[test]
fn demo_programs_check_clean() {
    let demos = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
    let mut seen = 0;
    for entry in std::fs::read_dir(demos).expect("demos directory") {
        let path = entry.expect("dir entry").path();
        if path.extension().is_none_or(|e| e != "stk") {
            continue;
        }
        seen += 1;
        let source = std::fs::read_to_string(&path).expect("readable demo");
        let tokens = lex(&path.to_string_lossy(), &source);
        let tree = Parser::new(tokens).parse().expect("demo parses");
        check_program(&tree).expect("demo checks");
    }
    assert!(seen >= 3, "expected the bundled demo programs");
}
