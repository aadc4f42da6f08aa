// tests/lexer_tests.rs

use hotkey_lang::ast::{Token, TokenKind};
use hotkey_lang::lexer::{Lexer, Position, tokenize};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source).into_iter().map(|t| t.kind).collect()
}

fn texts(source: &str) -> Vec<String> {
    tokenize(source)
        .into_iter()
        .filter(|t| !t.is(TokenKind::Eof))
        .map(|t| t.text)
        .collect()
}

// ============================================================================
// Punctuation and Operators
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        ("(", TokenKind::LParen),
        (")", TokenKind::RParen),
        ("{", TokenKind::LBrace),
        ("}", TokenKind::RBrace),
        (".", TokenKind::Dot),
        (",", TokenKind::Comma),
        (";", TokenKind::Semicolon),
        ("|", TokenKind::Pipe),
        ("=", TokenKind::Assign),
        ("*", TokenKind::Operator),
        ("/", TokenKind::Operator),
        ("-", TokenKind::Operator),
        ("<", TokenKind::Operator),
        (">", TokenKind::Operator),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token();
        assert_eq!(token.kind, expected, "Failed for input: {}", input);
        assert_eq!(token.text, input);
        assert!(lexer.next_token().is(TokenKind::Eof));
    }
}

#[test]
fn test_two_char_tokens() {
    let test_cases = vec![
        ("a == b", "=="),
        ("a != b", "!="),
        ("a <= b", "<="),
        ("a >= b", ">="),
        ("a && b", "&&"),
        ("a || b", "||"),
    ];

    for (input, op) in test_cases {
        let tokens = tokenize(input);
        assert!(tokens[1].is_operator(op), "Failed for input: {}", input);
    }
    assert_eq!(
        kinds("F1 => x"),
        vec![
            TokenKind::Hotkey,
            TokenKind::Arrow,
            TokenKind::Identifier,
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_word_operators() {
    let tokens = tokenize("a and b or c");
    assert!(tokens[1].is_operator("and"));
    assert!(tokens[3].is_operator("or"));
}

#[test]
fn test_double_colon_is_member_access() {
    let tokens = tokenize("clipboard::out");
    assert_eq!(tokens[1].kind, TokenKind::Dot);
    assert_eq!(tokens[1].text, "::");
}

// ============================================================================
// Keywords, Identifiers and Literals
// ============================================================================

#[test]
fn test_keywords() {
    assert_eq!(
        kinds("let if else while fn function return"),
        vec![
            TokenKind::Let,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::Fn,
            TokenKind::Fn,
            TokenKind::Return,
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_numbers() {
    assert_eq!(texts("42 3.14"), vec!["42", "3.14"]);
    // A dot not followed by a digit is member access, not a fraction.
    assert_eq!(
        kinds("1.x"),
        vec![
            TokenKind::Number,
            TokenKind::Dot,
            TokenKind::Identifier,
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_strings() {
    let tokens = tokenize("send \"Hello World!\"");
    assert_eq!(tokens[1], Token::new(TokenKind::String, "Hello World!", 1, 6));
}

#[test]
fn test_unterminated_string_is_recorded() {
    let mut lexer = Lexer::new("send \"oops\nnext");
    let tokens = lexer.tokenize();

    assert_eq!(tokens[1].kind, TokenKind::String);
    assert_eq!(tokens[1].text, "oops");
    assert_eq!(tokens[2].kind, TokenKind::Newline);
    assert_eq!(tokens[3].text, "next");

    let errors = lexer.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].position, Position { line: 1, column: 6 });
}

#[test]
fn test_unknown_characters_are_skipped() {
    let mut lexer = Lexer::new("a @ b");
    let tokens = lexer.tokenize();
    assert_eq!(tokens.len(), 3);
    assert_eq!(lexer.errors()[0].message, "unexpected character '@'");
}

// ============================================================================
// Hotkey Literals
// ============================================================================

#[test]
fn test_hotkey_literals() {
    let test_cases = vec![
        ("F1 => x", "F1"),
        ("f12 => x", "f12"),
        ("Ctrl+Shift+A => x", "Ctrl+Shift+A"),
        ("win+1 => x", "win+1"),
        ("#1 => x", "#1"),
        ("^c => x", "^c"),
        ("!Tab => x", "!Tab"),
        ("^+a => x", "^+a"),
        ("+a => x", "+a"),
        ("Escape => x", "Escape"),
    ];

    for (input, expected) in test_cases {
        let tokens = tokenize(input);
        assert_eq!(tokens[0].kind, TokenKind::Hotkey, "Failed for input: {}", input);
        assert_eq!(tokens[0].text, expected);
        assert_eq!(tokens[1].kind, TokenKind::Arrow);
    }
}

#[test]
fn test_plus_is_operator_mid_statement() {
    let tokens = tokenize("a +b");
    assert!(tokens[1].is_operator("+"));

    let tokens = tokenize("x\n+a => y");
    assert_eq!(tokens[2].kind, TokenKind::Hotkey);
    assert_eq!(tokens[2].text, "+a");
}

#[test]
fn test_plain_words_are_identifiers() {
    assert_eq!(tokenize("Escape")[0].kind, TokenKind::Identifier);
    assert_eq!(tokenize("ctrl")[0].kind, TokenKind::Identifier);
}

// ============================================================================
// Comments and Positions
// ============================================================================

#[test]
fn test_comments() {
    assert_eq!(
        kinds("x // trailing\ny"),
        vec![
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Identifier,
            TokenKind::Eof
        ]
    );

    let tokens = Lexer::new("// note\nx").with_comments(true).tokenize();
    assert_eq!(tokens[0].kind, TokenKind::Comment);
    assert_eq!(tokens[0].text, "// note");
}

#[test]
fn test_positions() {
    let tokens = tokenize("let x = 1\n  send x");
    let send = tokens.iter().find(|t| t.text == "send").unwrap();
    assert_eq!((send.line, send.column), (2, 3));

    let eof = tokens.last().unwrap();
    assert!(eof.is(TokenKind::Eof));
    assert_eq!(eof.line, 2);
}
