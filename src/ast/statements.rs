use crate::ast::Expr;

/// Statement node.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Hotkey binding
    ///
    /// Binds an action to a key combination. `hotkey` is always an
    /// [`Expr::Hotkey`]; `line` is where the literal starts.
    ///
    /// # Example
    /// ```text
    /// F1 => send "Hello World!"
    /// ```
    HotkeyBinding {
        hotkey: Expr,
        action: Box<Statement>,
        line: usize,
    },

    /// Braced statement list
    ///
    /// # Example
    /// ```text
    /// { clipboard.out | text.upper | send }
    /// ```
    Block(Vec<Statement>),

    /// Expression evaluated for its value or side effects
    Expression(Expr),

    /// Variable declaration, overwriting any existing binding
    ///
    /// # Example
    /// ```text
    /// let content = clipboard.out
    /// ```
    Let { name: String, value: Option<Expr> },

    /// Conditional
    ///
    /// # Example
    /// ```text
    /// if content | text.contains "error" { ... } else { ... }
    /// ```
    If {
        condition: Expr,
        consequence: Box<Statement>,
        alternative: Option<Box<Statement>>,
    },

    /// Loop
    ///
    /// # Example
    /// ```text
    /// while i < 3 { window.next; let i = i + 1 }
    /// ```
    While {
        condition: Expr,
        body: Box<Statement>,
    },

    /// Return from a function or action
    Return(Option<Expr>),

    /// User-defined function
    ///
    /// # Example
    /// ```text
    /// fn shout(s) { return s | text.upper }
    /// ```
    Function(FunctionDecl),
}

/// A function declared with `fn`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<String>,
    pub body: Box<Statement>,
}

impl Statement {
    /// Raw hotkey text of a binding, `None` for every other statement.
    pub fn hotkey_text(&self) -> Option<&str> {
        match self {
            Statement::HotkeyBinding {
                hotkey: Expr::Hotkey(text),
                ..
            } => Some(text),
            _ => None,
        }
    }
}
