// tests/parser_tests.rs

use hotkey_lang::ast::{BinOp, Expr, FunctionDecl, Statement, TokenKind};
use hotkey_lang::parser::{Parser, parse_source};
use hotkey_lang::printer::{to_ast_string, to_ast_string_pretty};

fn parse_one(source: &str) -> Statement {
    let program = parse_source(source).unwrap();
    assert_eq!(program.statements.len(), 1, "expected one statement in {:?}", source);
    program.statements.into_iter().next().unwrap()
}

fn parse_expr(source: &str) -> Expr {
    Parser::from_source(source).parse_expression().unwrap()
}

fn num(n: f64) -> Expr {
    Expr::Number(n)
}

// ============================================================================
// Hotkey Bindings
// ============================================================================

#[test]
fn test_send_binding() {
    let stmt = parse_one("F1 => send \"Hello World!\"");
    assert_eq!(
        stmt,
        Statement::HotkeyBinding {
            hotkey: Expr::Hotkey("F1".into()),
            action: Box::new(Statement::Expression(Expr::call(
                Expr::identifier("send"),
                vec![Expr::string("Hello World!")],
            ))),
            line: 1,
        }
    );
}

#[test]
fn test_binding_with_block_on_next_line() {
    let stmt = parse_one("Ctrl+V =>\n{\n  let c = clipboard.out\n  send c\n}");
    let Statement::HotkeyBinding { action, .. } = stmt else {
        panic!("expected binding");
    };
    let Statement::Block(body) = *action else {
        panic!("expected block");
    };
    assert_eq!(body.len(), 2);
    assert_eq!(
        body[0],
        Statement::Let {
            name: "c".into(),
            value: Some(Expr::member("clipboard", "out")),
        }
    );
}

#[test]
fn test_binding_lines() {
    let program = parse_source("F1 => send \"a\"\n\nF2 => send \"b\"").unwrap();
    let lines: Vec<usize> = program
        .bindings()
        .map(|s| match s {
            Statement::HotkeyBinding { line, .. } => *line,
            _ => 0,
        })
        .collect();
    assert_eq!(lines, vec![1, 3]);
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_standard_precedence() {
    assert_eq!(
        parse_expr("2 + 3 * 4"),
        Expr::binary(num(2.0), BinOp::Add, Expr::binary(num(3.0), BinOp::Multiply, num(4.0)))
    );
    assert_eq!(
        parse_expr("(2 + 3) * 4"),
        Expr::binary(Expr::binary(num(2.0), BinOp::Add, num(3.0)), BinOp::Multiply, num(4.0))
    );
    assert_eq!(
        parse_expr("1 < 2 and 3 > 2 or x"),
        Expr::binary(
            Expr::binary(
                Expr::binary(num(1.0), BinOp::LessThan, num(2.0)),
                BinOp::And,
                Expr::binary(num(3.0), BinOp::GreaterThan, num(2.0)),
            ),
            BinOp::Or,
            Expr::identifier("x"),
        )
    );
}

#[test]
fn test_left_associativity() {
    assert_eq!(
        parse_expr("10 - 4 - 3"),
        Expr::binary(Expr::binary(num(10.0), BinOp::Subtract, num(4.0)), BinOp::Subtract, num(3.0))
    );
}

#[test]
fn test_unary_minus() {
    assert_eq!(
        parse_expr("-5 * 2"),
        Expr::binary(Expr::binary(num(0.0), BinOp::Subtract, num(5.0)), BinOp::Multiply, num(2.0))
    );
}

#[test]
fn test_pipeline() {
    assert_eq!(
        parse_expr("clipboard.out | text.upper | text.replace \" \" \"_\""),
        Expr::Pipeline(vec![
            Expr::member("clipboard", "out"),
            Expr::member("text", "upper"),
            Expr::call(
                Expr::member("text", "replace"),
                vec![Expr::string(" "), Expr::string("_")],
            ),
        ])
    );
}

#[test]
fn test_pipeline_continues_on_next_line() {
    let stmt = parse_one("clipboard.out\n  | text.trim\n  | send");
    let Statement::Expression(Expr::Pipeline(stages)) = stmt else {
        panic!("expected pipeline");
    };
    assert_eq!(stages.len(), 3);
}

#[test]
fn test_command_arguments() {
    // Operators inside a command argument belong to the argument.
    assert_eq!(
        parse_expr("send \"DEBUG: \" + content"),
        Expr::call(
            Expr::identifier("send"),
            vec![Expr::binary(Expr::string("DEBUG: "), BinOp::Add, Expr::identifier("content"))],
        )
    );
    // Commas are optional; nested names are not command calls.
    assert_eq!(
        parse_expr("text.replace a, \"x\" b"),
        Expr::call(
            Expr::member("text", "replace"),
            vec![Expr::identifier("a"), Expr::string("x"), Expr::identifier("b")],
        )
    );
}

#[test]
fn test_command_head_takes_pipeline() {
    assert_eq!(
        parse_expr("send content | text.sanitize"),
        Expr::call(
            Expr::identifier("send"),
            vec![Expr::Pipeline(vec![
                Expr::identifier("content"),
                Expr::member("text", "sanitize"),
            ])],
        )
    );
    // Multi-argument commands and paren calls stay at the head of the pipeline.
    assert_eq!(
        parse_expr("text.replace a \" \" \"_\" | send"),
        Expr::Pipeline(vec![
            Expr::call(
                Expr::member("text", "replace"),
                vec![Expr::identifier("a"), Expr::string(" "), Expr::string("_")],
            ),
            Expr::identifier("send"),
        ])
    );
    assert_eq!(
        parse_expr("text.upper(a) | send"),
        Expr::Pipeline(vec![
            Expr::call(Expr::member("text", "upper"), vec![Expr::identifier("a")]),
            Expr::identifier("send"),
        ])
    );
}

#[test]
fn test_paren_call() {
    assert_eq!(
        parse_expr("window.focus(\"Editor\")"),
        Expr::call(Expr::member("window", "focus"), vec![Expr::string("Editor")])
    );
    assert_eq!(
        parse_expr("text.upper(text.trim \" a \")"),
        Expr::call(
            Expr::member("text", "upper"),
            vec![Expr::call(Expr::member("text", "trim"), vec![Expr::string(" a ")])],
        )
    );
    assert_eq!(parse_expr("window.next()"), Expr::call(Expr::member("window", "next"), vec![]));
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_if_else_chain() {
    let stmt = parse_one("if x == 1 {\n  send \"one\"\n}\nelse if x == 2 { send \"two\" } else { send \"many\" }");
    let Statement::If { alternative, .. } = stmt else {
        panic!("expected if");
    };
    let Some(alt) = alternative else {
        panic!("expected else branch");
    };
    assert!(matches!(*alt, Statement::If { alternative: Some(_), .. }));
}

#[test]
fn test_while_and_let() {
    let program = parse_source("let i = 0; while i < 3 { let i = i + 1 }").unwrap();
    assert_eq!(program.statements.len(), 2);
    assert!(matches!(program.statements[1], Statement::While { .. }));
}

#[test]
fn test_function_declaration() {
    let stmt = parse_one("fn shout(s) {\n  return text.upper(s) + \"!\"\n}");
    let Statement::Function(FunctionDecl { name, params, body }) = stmt else {
        panic!("expected function");
    };
    assert_eq!(name, "shout");
    assert_eq!(params, vec!["s"]);
    assert!(matches!(*body, Statement::Block(ref b) if matches!(b[0], Statement::Return(Some(_)))));
}

#[test]
fn test_bare_return() {
    let stmt = parse_one("{ return }");
    assert_eq!(stmt, Statement::Block(vec![Statement::Return(None)]));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_syntax_errors() {
    let err = parse_source("F1 send").unwrap_err();
    assert_eq!(err.found.text, "send");
    assert!(err.to_string().starts_with("line 1, column 4: expected '=>'"));

    let err = parse_source("{ send \"a\"").unwrap_err();
    assert_eq!(err.found.kind, TokenKind::Eof);

    let err = parse_source("let = 3").unwrap_err();
    assert_eq!(err.expected, "variable name after 'let'");

    assert!(parse_source("if x send \"a\"").is_err());
    assert!(parse_source("1 2").is_err());
}

// ============================================================================
// Printing
// ============================================================================

#[test]
fn test_print_compact() {
    let program = parse_source("let x = 2 + 3\nF1 => x | text.upper").unwrap();
    assert_eq!(
        to_ast_string(&program),
        "Program([Let(x = Binary(Number(2) + Number(3))), \
         HotkeyBinding(Hotkey(F1) => ExpressionStatement(Pipeline([Identifier(x), \
         Member(Identifier(text).Identifier(upper))])))])"
    );
}

#[test]
fn test_print_pretty() {
    let program = parse_source("send \"a\"\nsend \"b\"").unwrap();
    assert_eq!(
        to_ast_string_pretty(&program),
        "Program([\n  ExpressionStatement(Call(Identifier(send), [\n    String(\"a\")\n  ])),\n  \
         ExpressionStatement(Call(Identifier(send), [\n    String(\"b\")\n  ]))\n])"
    );
}

#[test]
fn test_printing_is_stable() {
    let source = "F1 => { if clipboard.out == \"\" { send \"empty\" } else { clipboard.out | send } }";
    let program = parse_source(source).unwrap();
    let first = to_ast_string(&program);
    assert_eq!(to_ast_string(&program), first);
    assert_eq!(program.to_string(), first);
    // Reparsing the same source gives the same tree.
    assert_eq!(to_ast_string(&parse_source(source).unwrap()), first);
}
