use crate::ast::Statement;

/// A parsed script.
///
/// Statement order is evaluation order for the interpreter and registration
/// order for hotkey bindings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Program { statements }
    }

    /// Top-level hotkey bindings, in source order.
    pub fn bindings(&self) -> impl Iterator<Item = &Statement> {
        self.statements
            .iter()
            .filter(|stmt| matches!(stmt, Statement::HotkeyBinding { .. }))
    }
}
