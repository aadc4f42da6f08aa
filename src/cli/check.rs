//! Validate hotkey scripts without running them

use super::CliError;
use crate::{
    hotkey::normalize,
    lexer::{LexError, Lexer},
    parser::Parser,
    printer::{to_ast_string, to_ast_string_pretty},
};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Script source
    pub source: String,
    /// Include the syntax tree in the result
    pub dump_ast: bool,
    /// Pretty-print the syntax tree
    pub pretty: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub struct CheckResult {
    /// Normalized hotkeys the script binds, in source order
    pub bindings: Vec<String>,
    /// Number of top-level statements
    pub statements: usize,
    /// Lexical problems that did not stop parsing
    pub warnings: Vec<LexError>,
    pub ast: Option<String>,
}

/// Parse a script and summarize it
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let mut lexer = Lexer::new(&options.source);
    let tokens = lexer.tokenize();
    let warnings = lexer.errors().to_vec();

    let program = Parser::new(tokens).parse_program()?;

    let ast = options.dump_ast.then(|| {
        if options.pretty {
            to_ast_string_pretty(&program)
        } else {
            to_ast_string(&program)
        }
    });

    Ok(CheckResult {
        bindings: program
            .bindings()
            .filter_map(|stmt| stmt.hotkey_text())
            .map(normalize)
            .collect(),
        statements: program.statements.len(),
        warnings,
        ast,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_lists_bindings() {
        let options = CheckOptions {
            source: "F1 => send \"a\"\nshift+ctrl+x => window.next\n".to_string(),
            ..Default::default()
        };
        let result = execute_check(&options).unwrap();
        assert_eq!(result.bindings, vec!["F1", "Ctrl+Shift+X"]);
        assert_eq!(result.statements, 2);
        assert!(result.ast.is_none());
    }

    #[test]
    fn test_check_reports_syntax_error() {
        let options = CheckOptions {
            source: "F1 send \"a\"".to_string(),
            ..Default::default()
        };
        assert!(matches!(execute_check(&options), Err(CliError::Syntax(_))));
    }
}
