use std::fmt;

/// A runtime value of the hotkey language.
///
/// The set of kinds is closed and every conversion between them is total:
/// any value can be read as a boolean, a number or a string without error.
///
/// # Type Preservation
///
/// Integers and floats are kept apart:
/// - Arithmetic on two integers stays integral unless it overflows
/// - Mixed arithmetic collapses whole results back to integers
/// - Number literals with no fractional part evaluate to integers
///
/// # Examples
///
/// ```
/// use hotkey_lang::Value;
///
/// assert_eq!(Value::from("42").as_number(), 42.0);
/// assert_eq!(Value::Integer(0).as_bool(), false);
/// assert_eq!(Value::List(vec!["a".into(), "b".into()]).as_string(), "[a, b]");
/// assert_eq!(Value::Null.as_string(), "null");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absence of a value
    #[default]
    Null,

    /// Boolean (true/false)
    Boolean(bool),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// UTF-8 string
    String(String),

    /// List of strings, e.g. window titles
    List(Vec<String>),
}

impl Value {
    /// Numeric value from a literal: integral when whole and in range.
    pub fn from_number(n: f64) -> Value {
        if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
            Value::Integer(n as i64)
        } else {
            Value::Float(n)
        }
    }

    /// Convert to boolean for conditions
    ///
    /// Null, zero, the empty string and the empty list are false.
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Integer(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
        }
    }

    /// Get as float
    ///
    /// Strings are parsed after trimming and fall back to 0; lists are 0.
    pub fn as_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Integer(n) => *n as f64,
            Value::Float(n) => *n,
            Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            Value::List(_) => 0.0,
        }
    }

    /// Get as string (concatenation, keystrokes)
    pub fn as_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            _ => self.to_string(),
        }
    }

    /// Returns a human-readable type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_bool() {
        assert!(!Value::Null.as_bool());
        assert!(!Value::Integer(0).as_bool());
        assert!(!Value::Float(0.0).as_bool());
        assert!(!Value::from("").as_bool());
        assert!(!Value::List(vec![]).as_bool());
        assert!(Value::Integer(-1).as_bool());
        assert!(Value::from("0").as_bool());
    }

    #[test]
    fn test_as_number() {
        assert_eq!(Value::from(" 2.5 ").as_number(), 2.5);
        assert_eq!(Value::from("abc").as_number(), 0.0);
        assert_eq!(Value::Boolean(true).as_number(), 1.0);
        assert_eq!(Value::List(vec!["1".into()]).as_number(), 0.0);
    }

    #[test]
    fn test_as_string() {
        assert_eq!(Value::Boolean(false).as_string(), "false");
        assert_eq!(Value::Float(2.5).as_string(), "2.5");
        assert_eq!(Value::Integer(-3).as_string(), "-3");
        assert_eq!(Value::List(vec![]).as_string(), "[]");
    }

    #[test]
    fn test_from_number() {
        assert_eq!(Value::from_number(14.0), Value::Integer(14));
        assert_eq!(Value::from_number(0.5), Value::Float(0.5));
        assert!(matches!(Value::from_number(1e300), Value::Float(_)));
    }
}
