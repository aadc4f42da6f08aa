use std::fmt;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    // Comparison
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,

    // Arithmetic
    /// Addition or string concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,

    // Logical
    /// Logical AND (`and`, `&&`)
    And,
    /// Logical OR (`or`, `||`)
    Or,
}

const ALL: [BinOp; 12] = [
    BinOp::Equal,
    BinOp::NotEqual,
    BinOp::LessThan,
    BinOp::GreaterThan,
    BinOp::LessEqual,
    BinOp::GreaterEqual,
    BinOp::Add,
    BinOp::Subtract,
    BinOp::Multiply,
    BinOp::Divide,
    BinOp::And,
    BinOp::Or,
];

impl BinOp {
    /// Maps an operator token's text to the operator it spells.
    pub fn from_symbol(symbol: &str) -> Option<BinOp> {
        match symbol {
            "==" => Some(BinOp::Equal),
            "!=" => Some(BinOp::NotEqual),
            "<" => Some(BinOp::LessThan),
            ">" => Some(BinOp::GreaterThan),
            "<=" => Some(BinOp::LessEqual),
            ">=" => Some(BinOp::GreaterEqual),
            "+" => Some(BinOp::Add),
            "-" => Some(BinOp::Subtract),
            "*" => Some(BinOp::Multiply),
            "/" => Some(BinOp::Divide),
            "and" | "&&" => Some(BinOp::And),
            "or" | "||" => Some(BinOp::Or),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Equal => "==",
            BinOp::NotEqual => "!=",
            BinOp::LessThan => "<",
            BinOp::GreaterThan => ">",
            BinOp::LessEqual => "<=",
            BinOp::GreaterEqual => ">=",
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }

    /// Stable numeric code, used to pass the operator across the native ABI.
    pub fn code(self) -> i64 {
        ALL.iter().position(|op| *op == self).unwrap_or_default() as i64
    }

    pub fn from_code(code: i64) -> Option<BinOp> {
        usize::try_from(code).ok().and_then(|i| ALL.get(i).copied())
    }

    /// `and`/`or` evaluate their right operand lazily.
    pub fn is_short_circuit(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[test]
fn test_codes_round_trip() {
    for op in ALL {
        assert_eq!(BinOp::from_code(op.code()), Some(op));
        assert_eq!(BinOp::from_symbol(op.symbol()), Some(op));
    }
    assert_eq!(BinOp::from_code(-1), None);
    assert_eq!(BinOp::from_code(99), None);
}
