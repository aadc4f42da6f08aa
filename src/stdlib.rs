//! Built-in modules.
//!
//! | Function | Arity | Result |
//! |---|---|---|
//! | `clipboard.get`, `clipboard.out` | 0 | clipboard text |
//! | `clipboard.set` | 1 | the text that was set |
//! | `text.upper`, `text.lower`, `text.trim`, `text.sanitize` | 1 | string |
//! | `text.replace` | 3 | string |
//! | `text.contains` | 2 | boolean |
//! | `send` | 1 | null |
//! | `window.focus` | 1 | boolean |
//! | `window.next`, `window.prev` | 0 | null |
//! | `window.list` | 0 | list of titles |
//! | `system.sleep` | 1 | null |
//! | `system.log` | 1 | null |

use std::{sync::LazyLock, time::Duration};

use regex::Regex;

use crate::{environment::ModuleRegistry, error::RuntimeError, host::Host, value::Value};

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static NULL: Value = Value::Null;

/// Registers every standard-library function in `registry`.
pub fn install(registry: &mut ModuleRegistry) {
    registry.register("clipboard", "get", 0, clipboard_get);
    registry.register("clipboard", "out", 0, clipboard_get);
    registry.register("clipboard", "set", 1, clipboard_set);

    registry.register("text", "upper", 1, text_upper);
    registry.register("text", "lower", 1, text_lower);
    registry.register("text", "trim", 1, text_trim);
    registry.register("text", "sanitize", 1, text_sanitize);
    registry.register("text", "replace", 3, text_replace);
    registry.register("text", "contains", 2, text_contains);

    registry.register("window", "focus", 1, window_focus);
    registry.register("window", "next", 0, window_next);
    registry.register("window", "prev", 0, window_prev);
    registry.register("window", "list", 0, window_list);

    registry.register("system", "sleep", 1, system_sleep);
    registry.register("system", "log", 1, system_log);

    registry.register_global("send", 1, send);
}

fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&NULL)
}

fn text(args: &[Value], index: usize) -> String {
    arg(args, index).as_string()
}

fn clipboard_get(host: &dyn Host, _args: &[Value]) -> Result<Value, RuntimeError> {
    host.clipboard_get().map(Value::String)
}

fn clipboard_set(host: &dyn Host, args: &[Value]) -> Result<Value, RuntimeError> {
    let content = text(args, 0);
    host.clipboard_set(&content)?;
    Ok(Value::String(content))
}

fn text_upper(_host: &dyn Host, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::String(text(args, 0).to_uppercase()))
}

fn text_lower(_host: &dyn Host, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::String(text(args, 0).to_lowercase()))
}

fn text_trim(_host: &dyn Host, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::String(text(args, 0).trim().to_string()))
}

/// Drops control characters, collapses whitespace runs to one space, trims.
pub fn sanitize(input: &str) -> String {
    let visible: String = input
        .chars()
        .filter(|c| c.is_whitespace() || !c.is_control())
        .collect();
    WHITESPACE_RUN.replace_all(&visible, " ").trim().to_string()
}

fn text_sanitize(_host: &dyn Host, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::String(sanitize(&text(args, 0))))
}

fn text_replace(_host: &dyn Host, args: &[Value]) -> Result<Value, RuntimeError> {
    let subject = text(args, 0);
    let search = text(args, 1);
    if search.is_empty() {
        return Ok(Value::String(subject));
    }
    Ok(Value::String(subject.replace(&search, &text(args, 2))))
}

fn text_contains(_host: &dyn Host, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(text(args, 0).contains(&text(args, 1))))
}

fn send(host: &dyn Host, args: &[Value]) -> Result<Value, RuntimeError> {
    host.send_keys(&text(args, 0))?;
    Ok(Value::Null)
}

fn window_focus(host: &dyn Host, args: &[Value]) -> Result<Value, RuntimeError> {
    host.focus_window(&text(args, 0)).map(Value::Boolean)
}

fn window_next(host: &dyn Host, _args: &[Value]) -> Result<Value, RuntimeError> {
    host.next_window()?;
    Ok(Value::Null)
}

fn window_prev(host: &dyn Host, _args: &[Value]) -> Result<Value, RuntimeError> {
    host.prev_window()?;
    Ok(Value::Null)
}

fn window_list(host: &dyn Host, _args: &[Value]) -> Result<Value, RuntimeError> {
    host.list_windows().map(Value::List)
}

fn system_sleep(host: &dyn Host, args: &[Value]) -> Result<Value, RuntimeError> {
    let millis = arg(args, 0).as_number();
    let millis = if millis.is_finite() && millis > 0.0 { millis as u64 } else { 0 };
    host.sleep(Duration::from_millis(millis))?;
    Ok(Value::Null)
}

fn system_log(host: &dyn Host, args: &[Value]) -> Result<Value, RuntimeError> {
    host.log(&text(args, 0));
    Ok(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("  a \t\n b\u{7}c  "), "a bc");
        assert_eq!(sanitize("\u{0}"), "");
    }

    #[test]
    fn test_replace_with_empty_search() {
        let host = RecordingHost::new();
        let args: [Value; 3] = ["abc".into(), "".into(), "x".into()];
        assert_eq!(text_replace(&host, &args).unwrap(), Value::from("abc"));
    }

    #[test]
    fn test_clipboard_set_returns_text() {
        let host = RecordingHost::new();
        assert_eq!(
            clipboard_set(&host, &[Value::Integer(7)]).unwrap(),
            Value::from("7")
        );
        assert_eq!(host.clipboard(), "7");
    }
}
