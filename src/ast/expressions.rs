use crate::ast::BinOp;

/// Abstract Syntax Tree node representing a parsed expression.
///
/// Composite variants own their children; the tree has no sharing and no
/// cycles.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Variable, function or module name
    ///
    /// # Example
    /// ```text
    /// content
    /// ```
    Identifier(String),

    /// Numeric literal
    ///
    /// # Example
    /// ```text
    /// 42
    /// 0.5
    /// ```
    Number(f64),

    /// String literal
    ///
    /// # Example
    /// ```text
    /// "Hello World!"
    /// ```
    String(String),

    /// Hotkey literal, kept as the raw combination text
    ///
    /// # Example
    /// ```text
    /// Ctrl+Shift+A
    /// ```
    Hotkey(String),

    /// Binary operation (arithmetic, comparison, logical)
    ///
    /// Unary minus is parsed as `0 - operand`.
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },

    /// Function call
    ///
    /// # Examples
    /// ```text
    /// window.focus("Editor")
    /// send "Hello"
    /// text.replace " " "_"
    /// ```
    Call { callee: Box<Expr>, args: Vec<Expr> },

    /// Member access, used for `module.function`
    ///
    /// # Example
    /// ```text
    /// clipboard.out
    /// ```
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
    },

    /// Pipeline of at least two stages
    ///
    /// # Example
    /// ```text
    /// clipboard.out | text.upper | send
    /// ```
    Pipeline(Vec<Expr>),
}

impl Expr {
    pub fn identifier(name: impl Into<String>) -> Expr {
        Expr::Identifier(name.into())
    }

    pub fn string(value: impl Into<String>) -> Expr {
        Expr::String(value.into())
    }

    pub fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    /// `module.property` with both sides as identifiers.
    pub fn member(module: impl Into<String>, property: impl Into<String>) -> Expr {
        Expr::Member {
            object: Box::new(Expr::Identifier(module.into())),
            property: Box::new(Expr::Identifier(property.into())),
        }
    }

    /// Joins stages into a pipeline, eliding the wrapper for a single stage.
    pub fn pipeline(mut stages: Vec<Expr>) -> Expr {
        if stages.len() == 1 {
            stages.remove(0)
        } else {
            Expr::Pipeline(stages)
        }
    }

    /// True for expressions that can name a callable: identifiers and
    /// member chains.
    pub fn is_callable_path(&self) -> bool {
        matches!(self, Expr::Identifier(_) | Expr::Member { .. })
    }
}
