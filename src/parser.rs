use crate::{
    ast::{BinOp, Expr, FunctionDecl, Program, Statement, Token, TokenKind},
    lexer::Lexer,
};

/// A structural mismatch in the token stream.
///
/// Carries the offending token (with its position) and what the parser
/// expected to find instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("line {}, column {}: expected {}, found {}", .found.line, .found.column, .expected, .found)]
pub struct SyntaxError {
    pub expected: String,
    pub found: Token,
}

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    /// Command calls (`send "x"`) are disabled while parsing the arguments
    /// of another command call.
    allow_command: bool,
    /// Token position right after the most recent command call.
    command_end: Option<usize>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        tokens.retain(|t| !t.is(TokenKind::Comment));
        if !tokens.last().is_some_and(|t| t.is(TokenKind::Eof)) {
            let (line, column) = tokens
                .last()
                .map(|t| (t.line, t.column + t.text.chars().count()))
                .unwrap_or((1, 1));
            tokens.push(Token::new(TokenKind::Eof, "", line, column));
        }
        Parser {
            tokens,
            position: 0,
            allow_command: true,
            command_end: None,
        }
    }

    pub fn from_source(source: &str) -> Self {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize();
        for error in lexer.errors() {
            log::warn!("{}", error);
        }
        Parser::new(tokens)
    }

    fn current(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn peek(&self, offset: usize) -> &Token {
        &self.tokens[(self.position + offset).min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !token.is(TokenKind::Eof) {
            self.position += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().is(kind)
    }

    fn error<T>(&self, expected: impl Into<String>) -> Result<T, SyntaxError> {
        Err(SyntaxError {
            expected: expected.into(),
            found: self.current().clone(),
        })
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, SyntaxError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            self.error(expected)
        }
    }

    fn skip_newlines(&mut self) {
        while self.check(TokenKind::Newline) {
            self.advance();
        }
    }

    fn skip_separators(&mut self) {
        while self.check(TokenKind::Newline) || self.check(TokenKind::Semicolon) {
            self.advance();
        }
    }

    /// Kind of the first token after any newlines, without consuming.
    fn kind_after_newlines(&self) -> TokenKind {
        let mut offset = 0;
        while self.peek(offset).is(TokenKind::Newline) {
            offset += 1;
        }
        self.peek(offset).kind
    }

    /// A statement ends at a separator, end of input, or the closing brace
    /// of the enclosing block.
    fn end_statement(&mut self, in_block: bool) -> Result<(), SyntaxError> {
        match self.current().kind {
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof => Ok(()),
            TokenKind::RBrace if in_block => Ok(()),
            _ => self.error("newline or ';' after statement"),
        }
    }

    /// Parse a complete script
    pub fn parse_program(&mut self) -> Result<Program, SyntaxError> {
        let mut statements = vec![];

        self.skip_separators();
        while !self.check(TokenKind::Eof) {
            statements.push(self.parse_statement()?);
            self.end_statement(false)?;
            self.skip_separators();
        }

        Ok(Program::new(statements))
    }

    pub fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        match self.current().kind {
            TokenKind::Hotkey => self.parse_binding(),
            TokenKind::LBrace => self.parse_block(),
            TokenKind::Let => self.parse_let(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Fn => self.parse_function(),
            TokenKind::Return => self.parse_return(),
            _ => Ok(Statement::Expression(self.parse_expression()?)),
        }
    }

    fn parse_binding(&mut self) -> Result<Statement, SyntaxError> {
        let hotkey = self.advance();
        self.expect(TokenKind::Arrow, "'=>' after hotkey literal")?;
        self.skip_newlines();
        let action = self.parse_statement()?;

        Ok(Statement::HotkeyBinding {
            hotkey: Expr::Hotkey(hotkey.text),
            action: Box::new(action),
            line: hotkey.line,
        })
    }

    fn parse_block(&mut self) -> Result<Statement, SyntaxError> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut statements = vec![];

        self.skip_separators();
        while !self.check(TokenKind::RBrace) {
            if self.check(TokenKind::Eof) {
                return self.error("'}' to close block");
            }
            statements.push(self.parse_statement()?);
            self.end_statement(true)?;
            self.skip_separators();
        }

        self.advance(); // consume }
        Ok(Statement::Block(statements))
    }

    fn parse_let(&mut self) -> Result<Statement, SyntaxError> {
        self.advance(); // consume let
        let name = self
            .expect(TokenKind::Identifier, "variable name after 'let'")?
            .text;

        let value = if self.check(TokenKind::Assign) {
            self.advance();
            self.skip_newlines();
            Some(self.parse_expression()?)
        } else {
            None
        };

        Ok(Statement::Let { name, value })
    }

    fn parse_if(&mut self) -> Result<Statement, SyntaxError> {
        self.advance(); // consume if
        let condition = self.parse_expression()?;
        self.skip_newlines();
        let consequence = self.parse_block()?;

        let alternative = if self.kind_after_newlines() == TokenKind::Else {
            self.skip_newlines();
            self.advance(); // consume else
            self.skip_newlines();
            if self.check(TokenKind::If) {
                Some(Box::new(self.parse_if()?))
            } else {
                Some(Box::new(self.parse_block()?))
            }
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            consequence: Box::new(consequence),
            alternative,
        })
    }

    fn parse_while(&mut self) -> Result<Statement, SyntaxError> {
        self.advance(); // consume while
        let condition = self.parse_expression()?;
        self.skip_newlines();
        let body = self.parse_block()?;

        Ok(Statement::While {
            condition,
            body: Box::new(body),
        })
    }

    fn parse_function(&mut self) -> Result<Statement, SyntaxError> {
        self.advance(); // consume fn
        let name = self
            .expect(TokenKind::Identifier, "function name after 'fn'")?
            .text;

        self.expect(TokenKind::LParen, "'(' after function name")?;
        let mut params = vec![];
        if !self.check(TokenKind::RParen) {
            loop {
                params.push(self.expect(TokenKind::Identifier, "parameter name")?.text);
                if self.check(TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')' to close parameter list")?;
        self.skip_newlines();
        let body = self.parse_block()?;

        Ok(Statement::Function(FunctionDecl {
            name,
            params,
            body: Box::new(body),
        }))
    }

    fn parse_return(&mut self) -> Result<Statement, SyntaxError> {
        self.advance(); // consume return
        match self.current().kind {
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof => {
                Ok(Statement::Return(None))
            }
            _ => Ok(Statement::Return(Some(self.parse_expression()?))),
        }
    }

    /// Pipelines bind loosest. A `|` leading the next line continues the
    /// pipeline.
    ///
    /// A one-argument command call at the head takes the rest of the
    /// pipeline as its argument: `send content | text.sanitize` sends the
    /// sanitized text.
    pub fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        let head = self.parse_or()?;
        let command_head = self.command_end == Some(self.position);
        let mut stages = vec![head];

        loop {
            if self.check(TokenKind::Pipe) {
                self.advance();
            } else if self.check(TokenKind::Newline) && self.kind_after_newlines() == TokenKind::Pipe
            {
                self.skip_newlines();
                self.advance();
            } else {
                break;
            }
            self.skip_newlines();
            stages.push(self.parse_or()?);
        }

        if command_head && stages.len() > 1 {
            let mut head = stages.remove(0);
            if let Expr::Call { args, .. } = &mut head
                && args.len() == 1
            {
                let argument = args.remove(0);
                stages.insert(0, argument);
                args.push(Expr::pipeline(stages));
                return Ok(head);
            }
            stages.insert(0, head);
        }

        Ok(Expr::pipeline(stages))
    }

    fn parse_binary_level(
        &mut self,
        operators: &[BinOp],
        next: fn(&mut Parser) -> Result<Expr, SyntaxError>,
    ) -> Result<Expr, SyntaxError> {
        let mut left = next(self)?;

        loop {
            let op = match BinOp::from_symbol(&self.current().text) {
                Some(op) if self.check(TokenKind::Operator) && operators.contains(&op) => op,
                _ => break,
            };

            self.advance();
            self.skip_newlines();
            let right = next(self)?;
            left = Expr::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_binary_level(&[BinOp::Or], Parser::parse_and)
    }

    fn parse_and(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_binary_level(&[BinOp::And], Parser::parse_comparison)
    }

    fn parse_comparison(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_binary_level(
            &[
                BinOp::Equal,
                BinOp::NotEqual,
                BinOp::LessThan,
                BinOp::GreaterThan,
                BinOp::LessEqual,
                BinOp::GreaterEqual,
            ],
            Parser::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_binary_level(&[BinOp::Add, BinOp::Subtract], Parser::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_binary_level(&[BinOp::Multiply, BinOp::Divide], Parser::parse_unary)
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        if self.current().is_operator("-") {
            self.advance();
            let operand = self.parse_unary()?;
            // Represent as 0 - operand
            return Ok(Expr::binary(Expr::Number(0.0), BinOp::Subtract, operand));
        }
        self.parse_call()
    }

    /// Tokens that can begin a command-call argument on the same line.
    fn starts_argument(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::String | TokenKind::Number | TokenKind::Identifier | TokenKind::Hotkey
        )
    }

    /// Member access, parenthesized calls and command calls.
    fn parse_call(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.check(TokenKind::Dot) {
                self.advance(); // consume .
                let property = self
                    .expect(TokenKind::Identifier, "property name after '.'")?
                    .text;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property: Box::new(Expr::Identifier(property)),
                };
            } else if self.check(TokenKind::LParen) && expr.is_callable_path() {
                let args = self.parse_arguments()?;
                expr = Expr::call(expr, args);
            } else {
                break;
            }
        }

        if self.allow_command && expr.is_callable_path() && self.starts_argument() {
            self.allow_command = false;
            let mut args = vec![];
            let parsed = loop {
                match self.parse_or() {
                    Ok(arg) => args.push(arg),
                    Err(e) => break Err(e),
                }
                if self.check(TokenKind::Comma) {
                    self.advance();
                }
                if !self.starts_argument() {
                    break Ok(());
                }
            };
            self.allow_command = true;
            parsed?;
            expr = Expr::call(expr, args);
            self.command_end = Some(self.position);
        }

        Ok(expr)
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        self.expect(TokenKind::LParen, "'('")?;
        let saved = std::mem::replace(&mut self.allow_command, true);
        let result = self.parse_argument_list();
        self.allow_command = saved;
        result
    }

    fn parse_argument_list(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut args = vec![];
        self.skip_newlines();
        if self.check(TokenKind::RParen) {
            self.advance();
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);
            self.skip_newlines();
            if self.check(TokenKind::Comma) {
                self.advance();
                self.skip_newlines();
            } else {
                self.expect(TokenKind::RParen, "')' to close argument list")?;
                return Ok(args);
            }
        }
    }

    /// Parse primary expressions: literals, identifiers and parentheses
    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        match self.current().kind {
            TokenKind::Number => {
                let value = match self.current().text.parse::<f64>() {
                    Ok(n) => n,
                    Err(_) => return self.error("number"),
                };
                self.advance();
                Ok(Expr::Number(value))
            }
            TokenKind::String => Ok(Expr::String(self.advance().text)),
            TokenKind::Hotkey => Ok(Expr::Hotkey(self.advance().text)),
            TokenKind::Identifier => Ok(Expr::Identifier(self.advance().text)),
            TokenKind::LParen => {
                self.advance();
                let saved = std::mem::replace(&mut self.allow_command, true);
                self.skip_newlines();
                let expr = self.parse_expression();
                self.allow_command = saved;
                let expr = expr?;
                self.skip_newlines();
                self.expect(TokenKind::RParen, "')' to close parenthesized expression")?;
                Ok(expr)
            }
            _ => self.error("expression"),
        }
    }
}

/// Parses a token stream into a [`Program`].
pub fn parse(tokens: Vec<Token>) -> Result<Program, SyntaxError> {
    Parser::new(tokens).parse_program()
}

/// Lexes and parses `source`.
pub fn parse_source(source: &str) -> Result<Program, SyntaxError> {
    Parser::from_source(source).parse_program()
}

#[test]
fn test_precedence() {
    let program = parse_source("2 + 3 * 4").unwrap();
    assert_eq!(
        program.statements,
        vec![Statement::Expression(Expr::binary(
            Expr::Number(2.0),
            BinOp::Add,
            Expr::binary(Expr::Number(3.0), BinOp::Multiply, Expr::Number(4.0)),
        ))]
    );
}

#[test]
fn test_single_stage_pipeline_is_elided() {
    let program = parse_source("clipboard.out").unwrap();
    assert_eq!(
        program.statements,
        vec![Statement::Expression(Expr::member("clipboard", "out"))]
    );
}
