use crate::ast::{Token, TokenKind};
use crate::hotkey::{Modifier, is_function_key};
use std::fmt;

/// 1-based source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A lexical problem. The lexer records these and keeps going; scanning
/// always reaches end of input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{position}: {message}")]
pub struct LexError {
    pub message: String,
    pub position: Position,
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    keep_comments: bool,
    /// Nothing but whitespace or comments since the last newline, `{` or `;`.
    statement_start: bool,
    errors: Vec<LexError>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            keep_comments: false,
            statement_start: true,
            errors: Vec::new(),
        }
    }

    /// Emit `//` comments as [`TokenKind::Comment`] tokens instead of
    /// dropping them.
    pub fn with_comments(mut self, keep: bool) -> Self {
        self.keep_comments = keep;
        self
    }

    /// Problems found so far.
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    /// Scans the whole input. The last token is always [`TokenKind::Eof`].
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.is(TokenKind::Eof);
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += 1;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() && ch != '\n' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn error(&mut self, message: String, line: usize, column: usize) {
        log::debug!("lex error at {}:{}: {}", line, column, message);
        self.errors.push(LexError {
            message,
            position: Position { line, column },
        });
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, line: usize, column: usize) -> String {
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    self.advance();
                    return result;
                }
                // Strings do not span lines; keep the rest of the file lexable.
                '\n' => break,
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        self.error("unterminated string".to_string(), line, column);
        result
    }

    fn read_number(&mut self) -> String {
        let mut number = String::new();
        let mut is_float = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        number
    }

    fn read_comment(&mut self) -> String {
        let mut text = String::new();
        while let Some(ch) = self.current_char() {
            if ch == '\n' {
                break;
            }
            text.push(ch);
            self.advance();
        }
        text
    }

    /// Bounded lookahead: only blanks between here and `=>`.
    fn arrow_follows(&self) -> bool {
        let mut offset = 0;
        while let Some(ch) = self.peek_char(offset) {
            if ch == ' ' || ch == '\t' {
                offset += 1;
            } else {
                return ch == '=' && self.peek_char(offset + 1) == Some('>');
            }
        }
        false
    }

    fn key_char_at(&self, offset: usize) -> bool {
        self.peek_char(offset).is_some_and(|c| !c.is_whitespace())
    }

    fn read_key_segment(&mut self, text: &mut String) {
        match self.current_char() {
            Some(ch) if ch.is_ascii_alphanumeric() || ch == '_' => {
                text.push_str(&self.read_identifier());
            }
            Some(ch) if !ch.is_whitespace() => {
                text.push(ch);
                self.advance();
            }
            _ => {}
        }
    }

    /// Reads the remainder of a hotkey literal. `text` holds whatever was
    /// already consumed (a modifier word, or nothing for symbolic prefixes).
    fn read_hotkey(&mut self, mut text: String) -> String {
        if text.is_empty() {
            while let Some(ch) = self.current_char() {
                if Modifier::from_symbol(ch).is_some() && self.key_char_at(1) {
                    text.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
            self.read_key_segment(&mut text);
        }

        while self.current_char() == Some('+') && self.key_char_at(1) {
            text.push('+');
            self.advance();
            self.read_key_segment(&mut text);
        }
        text
    }

    fn read_word(&mut self) -> (TokenKind, String) {
        let word = self.read_identifier();

        if Modifier::from_word(&word).is_some()
            && self.current_char() == Some('+')
            && self.key_char_at(1)
        {
            return (TokenKind::Hotkey, self.read_hotkey(word));
        }
        if is_function_key(&word) {
            return (TokenKind::Hotkey, word);
        }

        let kind = match word.as_str() {
            "let" => TokenKind::Let,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "fn" | "function" => TokenKind::Fn,
            "return" => TokenKind::Return,
            "and" | "or" => TokenKind::Operator,
            _ if self.arrow_follows() => TokenKind::Hotkey,
            _ => TokenKind::Identifier,
        };
        (kind, word)
    }

    fn single(&mut self, kind: TokenKind, text: &str) -> (TokenKind, String) {
        for _ in text.chars() {
            self.advance();
        }
        (kind, text.to_string())
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();
            let (line, column) = (self.line, self.column);

            let scanned = match self.current_char() {
                None => Some((TokenKind::Eof, String::new())),
                Some('\n') => Some(self.single(TokenKind::Newline, "\n")),
                Some('/') if self.peek_char(1) == Some('/') => {
                    let text = self.read_comment();
                    if self.keep_comments {
                        return Token::new(TokenKind::Comment, text, line, column);
                    }
                    None
                }
                Some('"') => Some((TokenKind::String, self.read_string(line, column))),
                Some(ch) if ch.is_ascii_digit() => Some((TokenKind::Number, self.read_number())),
                Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => Some(self.read_word()),
                Some('#') | Some('^') => Some((TokenKind::Hotkey, self.read_hotkey(String::new()))),
                Some('!') => match self.peek_char(1) {
                    Some('=') => Some(self.single(TokenKind::Operator, "!=")),
                    Some(c) if !c.is_whitespace() => {
                        Some((TokenKind::Hotkey, self.read_hotkey(String::new())))
                    }
                    _ => {
                        self.advance();
                        self.error("unexpected '!'".to_string(), line, column);
                        None
                    }
                },
                Some('+') => {
                    if self.statement_start && self.key_char_at(1) {
                        Some((TokenKind::Hotkey, self.read_hotkey(String::new())))
                    } else {
                        Some(self.single(TokenKind::Operator, "+"))
                    }
                }
                Some('=') => match self.peek_char(1) {
                    Some('>') => Some(self.single(TokenKind::Arrow, "=>")),
                    Some('=') => Some(self.single(TokenKind::Operator, "==")),
                    _ => Some(self.single(TokenKind::Assign, "=")),
                },
                Some('<') => match self.peek_char(1) {
                    Some('=') => Some(self.single(TokenKind::Operator, "<=")),
                    _ => Some(self.single(TokenKind::Operator, "<")),
                },
                Some('>') => match self.peek_char(1) {
                    Some('=') => Some(self.single(TokenKind::Operator, ">=")),
                    _ => Some(self.single(TokenKind::Operator, ">")),
                },
                Some('|') => match self.peek_char(1) {
                    Some('|') => Some(self.single(TokenKind::Operator, "||")),
                    _ => Some(self.single(TokenKind::Pipe, "|")),
                },
                Some('&') if self.peek_char(1) == Some('&') => {
                    Some(self.single(TokenKind::Operator, "&&"))
                }
                Some(':') if self.peek_char(1) == Some(':') => Some(self.single(TokenKind::Dot, "::")),
                Some('-') => Some(self.single(TokenKind::Operator, "-")),
                Some('*') => Some(self.single(TokenKind::Operator, "*")),
                Some('/') => Some(self.single(TokenKind::Operator, "/")),
                Some('(') => Some(self.single(TokenKind::LParen, "(")),
                Some(')') => Some(self.single(TokenKind::RParen, ")")),
                Some('{') => Some(self.single(TokenKind::LBrace, "{")),
                Some('}') => Some(self.single(TokenKind::RBrace, "}")),
                Some('.') => Some(self.single(TokenKind::Dot, ".")),
                Some(',') => Some(self.single(TokenKind::Comma, ",")),
                Some(';') => Some(self.single(TokenKind::Semicolon, ";")),
                Some(ch) => {
                    self.advance();
                    self.error(format!("unexpected character '{}'", ch), line, column);
                    None
                }
            };

            if let Some((kind, text)) = scanned {
                self.statement_start = matches!(
                    kind,
                    TokenKind::Newline | TokenKind::LBrace | TokenKind::Semicolon
                );
                return Token::new(kind, text, line, column);
            }
        }
    }
}

/// Tokenizes `source`, discarding lexical diagnostics.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

#[test]
fn test_keywords() {
    let kinds: Vec<TokenKind> = tokenize("let if else while fn function return")
        .into_iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Let,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::Fn,
            TokenKind::Fn,
            TokenKind::Return,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_pipe() {
    let tokens = tokenize("clipboard.out | text.upper");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Identifier,
            TokenKind::Dot,
            TokenKind::Identifier,
            TokenKind::Pipe,
            TokenKind::Identifier,
            TokenKind::Dot,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
    assert_eq!(tokens[4].text, "text");
    assert_eq!(tokens[4].column, 17);
}
