// tests/jit_tests.rs

use hotkey_lang::ast::Statement;
use hotkey_lang::parser::parse_source;
use hotkey_lang::{
    CodeGenerator, CompileError, Host, Interpreter, JitManager, ModuleRegistry, RecordingHost,
    RuntimeError, Value,
};
use std::sync::Arc;

fn host() -> RecordingHost {
    RecordingHost::new()
        .with_clipboard("  Some Text  ")
        .with_windows(["Editor", "Terminal", "Browser"])
}

fn interpret(source: &str) -> (Result<Value, RuntimeError>, Vec<String>) {
    let host = Arc::new(host());
    let program = parse_source(source).unwrap();
    let mut interpreter = Interpreter::new(Arc::clone(&host) as Arc<dyn Host>);
    let mut env = interpreter.environment();
    let result = interpreter.evaluate(&program, &mut env);
    (result, host.sent())
}

fn compile(source: &str) -> Result<hotkey_lang::NativeFunction, CompileError> {
    let program = parse_source(source).unwrap();
    let generator = CodeGenerator::new(Arc::new(ModuleRegistry::standard()));
    generator.compile_statement(&Statement::Block(program.statements))
}

fn run_native(source: &str) -> (Result<Value, RuntimeError>, Vec<String>) {
    let host = host();
    let function = compile(source).unwrap();
    let result = function.invoke(&host);
    (result, host.sent())
}

// ============================================================================
// Differential Equivalence
// ============================================================================

#[test]
fn test_native_matches_interpreter() {
    let programs = [
        "2 + 3 * 4",
        "(2 + 3) * 4 - -1",
        "7 / 2",
        "1 + 0.5",
        "2 * 1.5",
        "\"n=\" + 3",
        "\"5\" == 5",
        "\"a\" != \"b\" and 3 <= 3",
        "0 or \"\"",
        "let x = 2\nlet y = x * 10\ny - 1",
        "let i = 0\nlet s = \"\"\nwhile i < 3 {\n  let s = s + i\n  let i = i + 1\n}\ns",
        "if 2 > 1 { \"yes\" } else { \"no\" }",
        "if 0 { 1 }",
        "let n = 5\nif n < 3 { \"small\" } else if n < 10 { \"medium\" } else { \"large\" }",
        "\"hello world\" | text.upper | text.replace \" \" \"_\"",
        "clipboard.out | text.trim | text.lower",
        "window.list",
        "\"x\" | window.next",
        "text.contains(clipboard.get, \"Text\")",
        "send \"a\" + 1\nsend clipboard.out | text.sanitize",
        "return 5\n6",
        "1 / 0",
        "text.replace \"abc\" \"\" \"x\"",
        "let i = 0\nlet r = 0\nwhile i < 2 {\n if i == 1 { let r = y }\n let y = 7\n let i = i + 1\n}\nr",
        "if 0 { let x = 1 }\nx",
        "if 0 { let send = 1 }\nsend",
        "if 0 { let window = 1 }\nlet w = 2\nw",
    ];

    for source in programs {
        assert_eq!(run_native(source), interpret(source), "Failed for program: {}", source);
    }
}

#[test]
fn test_error_aborts_remaining_statements() {
    let (result, sent) = run_native("send \"before\"\n1 / 0\nsend \"after\"");
    assert_eq!(result, Err(RuntimeError::DivisionByZero));
    assert_eq!(sent, vec!["before"]);
}

#[test]
fn test_short_circuit_skips_side_effects() {
    let (result, sent) = run_native("0 and send \"never\"");
    assert_eq!(result, Ok(Value::Boolean(false)));
    assert!(sent.is_empty());
}

// ============================================================================
// Compile-time Errors
// ============================================================================

#[test]
fn test_resolution_errors_surface_at_compile_time() {
    let cases = [
        ("nope", RuntimeError::UnknownIdentifier("nope".into())),
        ("foo.bar", RuntimeError::UnknownModule("foo".into())),
        (
            "text.nope \"a\"",
            RuntimeError::UnknownFunction {
                module: "text".into(),
                function: "nope".into(),
            },
        ),
        (
            "text.replace \"a\" \"b\"",
            RuntimeError::ArityMismatch {
                function: "text.replace".into(),
                expected: 3,
                found: 2,
            },
        ),
        ("\"x\" | 5", RuntimeError::InvalidPipelineStage("Number(5)".into())),
    ];

    for (source, expected) in cases {
        match compile(source) {
            Err(CompileError::Resolution(error)) => assert_eq!(error, expected, "{}", source),
            Err(other) => panic!("unexpected error for {}: {}", source, other),
            Ok(_) => panic!("{} should not compile", source),
        }
    }
}

#[test]
fn test_unsupported_constructs() {
    assert!(matches!(compile("fn f() { 1 }"), Err(CompileError::Unsupported(_))));
    assert!(matches!(compile("{ F1 => send \"x\" }"), Err(CompileError::Unsupported(_))));
}

// ============================================================================
// JIT Manager
// ============================================================================

#[test]
fn test_bind_and_trigger() {
    let host = Arc::new(RecordingHost::new());
    let mut jit = JitManager::new(Arc::clone(&host) as Arc<dyn Host>);
    let program = parse_source("F1 => send \"Hello World!\"").unwrap();

    let report = jit.compile_script(&program);
    assert!(report.is_success());
    assert_eq!(report.bound, vec!["F1"]);

    assert_eq!(jit.trigger("f1"), Some(Value::Null));
    assert_eq!(jit.trigger("f1"), Some(Value::Null));
    assert_eq!(host.sent(), vec!["Hello World!", "Hello World!"]);
    assert_eq!(jit.trigger("F2"), None);
}

#[test]
fn test_rebind_replaces_function() {
    let host = Arc::new(RecordingHost::new());
    let mut jit = JitManager::new(Arc::clone(&host) as Arc<dyn Host>);
    let program = parse_source("win+1 => send \"first\"\n#1 => send \"second\"").unwrap();

    let report = jit.compile_script(&program);
    assert_eq!(report.bound, vec!["Win+1", "Win+1"]);
    assert_eq!(jit.bound_hotkeys(), vec!["Win+1"]);

    jit.trigger("Win+1");
    assert_eq!(host.sent(), vec!["second"]);
}

#[test]
fn test_failed_binding_keeps_others() {
    let host = Arc::new(RecordingHost::new());
    let mut jit = JitManager::new(Arc::clone(&host) as Arc<dyn Host>);
    let program = parse_source("F1 => send \"ok\"\nlet x = 1\nF2 => nonsense\nF3 => send \"also ok\"").unwrap();

    let report = jit.compile_script(&program);
    assert!(!report.is_success());
    assert_eq!(report.bound, vec!["F1", "F3"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].hotkey, "F2");
    assert_eq!(report.failed[0].line, 3);
    assert!(!jit.is_bound("F2"));
}

#[test]
fn test_failed_rebind_keeps_previous() {
    let host = Arc::new(RecordingHost::new());
    let mut jit = JitManager::new(Arc::clone(&host) as Arc<dyn Host>);
    let good = parse_source("send \"old\"").unwrap();
    let bad = parse_source("missing").unwrap();

    jit.bind("F5", &good.statements[0]).unwrap();
    assert!(jit.bind("F5", &bad.statements[0]).is_err());

    jit.trigger("F5");
    assert_eq!(host.sent(), vec!["old"]);
}

#[test]
fn test_runtime_failure_and_unbind() {
    let host = Arc::new(RecordingHost::new());
    let mut jit = JitManager::new(Arc::clone(&host) as Arc<dyn Host>);
    let program = parse_source("F9 => 10 / (5 - 5)").unwrap();
    jit.compile_script(&program);

    assert_eq!(jit.invoke("F9"), Some(Err(RuntimeError::DivisionByZero)));
    assert_eq!(jit.trigger("F9"), Some(Value::Null));

    assert!(jit.unbind("f9"));
    assert!(host.registered().is_empty());
    assert_eq!(jit.trigger("F9"), None);
}
