//! JSON <-> hotkey Value conversion utilities

use crate::Value;

/// Convert serde_json::Value to a script Value
///
/// Arrays become string lists (each element rendered as text); objects have
/// no counterpart and are rendered as their JSON text.
pub fn json_to_value(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Float(n.as_f64().unwrap_or(0.0)),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::List(
            arr.into_iter()
                .map(|item| json_to_value(item).as_string())
                .collect(),
        ),
        obj @ serde_json::Value::Object(_) => Value::String(obj.to_string()),
    }
}

/// Convert a script Value to serde_json::Value
pub fn value_to_json(v: Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        Value::List(items) => {
            serde_json::Value::Array(items.into_iter().map(serde_json::Value::String).collect())
        }
    }
}
