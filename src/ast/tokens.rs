use std::fmt;

/// Lexical category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    /// `let`
    Let,
    /// `if`
    If,
    /// `else`
    Else,
    /// `while`
    While,
    /// `fn` or `function`
    Fn,
    /// `return`
    Return,

    // Literals
    /// Variable, module or function name
    ///
    /// # Examples
    /// ```text
    /// content
    /// clipboard
    /// _tmp1
    /// ```
    Identifier,

    /// Integer or decimal number
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 3.14
    /// ```
    Number,

    /// Double-quoted string, taken verbatim (no escape processing)
    ///
    /// # Examples
    /// ```text
    /// "Hello World!"
    /// ```
    String,

    /// Key or modifier+key combination, lexed as a single unit
    ///
    /// # Examples
    /// ```text
    /// F1
    /// Ctrl+Shift+A
    /// #1
    /// ^!v
    /// ```
    Hotkey,

    // Operators
    /// Binding operator (`=`)
    Assign,

    /// Hotkey action arrow (`=>`)
    Arrow,

    /// Binary operator, the operator itself is in [`Token::text`]
    ///
    /// # Examples
    /// ```text
    /// + - * / == != < <= > >= and or
    /// ```
    Operator,

    /// Pipeline operator (`|`)
    ///
    /// # Examples
    /// ```text
    /// clipboard.out | text.upper | send
    /// ```
    Pipe,

    // Delimiters
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `.` (also produced for the `::` module separator)
    Dot,
    /// `,`
    Comma,
    /// `;`
    Semicolon,

    /// Line comment (`// ...`), only emitted when the lexer keeps comments
    Comment,

    /// End of a source line
    Newline,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Human readable name used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Let => "'let'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::While => "'while'",
            TokenKind::Fn => "'fn'",
            TokenKind::Return => "'return'",
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Hotkey => "hotkey literal",
            TokenKind::Assign => "'='",
            TokenKind::Arrow => "'=>'",
            TokenKind::Operator => "operator",
            TokenKind::Pipe => "'|'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Dot => "'.'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Comment => "comment",
            TokenKind::Newline => "newline",
            TokenKind::Eof => "end of input",
        }
    }
}

/// A single lexical token.
///
/// Tokens are produced in source order and never mutated afterwards.
/// `line` and `column` are 1-based and point at the first character.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// True for an operator token with exactly this spelling.
    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Newline => write!(f, "newline"),
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::String => write!(f, "\"{}\"", self.text),
            _ => write!(f, "'{}'", self.text),
        }
    }
}
