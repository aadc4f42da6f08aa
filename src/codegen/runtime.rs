//! Runtime support called from generated code.
//!
//! Native actions never touch [`Value`]s directly. Every value lives in the
//! [`Frame`] of the running invocation and generated code passes around
//! `i64` handles (indices into the frame). Handle `0` is always null.
//!
//! A helper that fails stores the error in the frame and returns
//! [`FAILED`]; generated code checks for it after every fallible call and
//! unwinds straight to the function's abort block.

use cranelift_jit::JITBuilder;

use crate::{
    ast::BinOp,
    environment::ModuleRegistry,
    error::RuntimeError,
    host::Host,
    ops::apply_binop,
    value::Value,
};

/// Returned by a helper (and by the action itself) when the frame holds an
/// error.
pub const FAILED: i64 = -1;

/// Handle of the null value every frame starts with.
pub const NULL_HANDLE: i64 = 0;

/// Value of a `let` variable that has not been assigned on the path taken.
/// Never handed to a helper.
pub const UNDEFINED: i64 = -2;

/// Largest argument count a builtin call can pass natively.
pub const MAX_CALL_ARGS: usize = 3;

/// Helper symbols and the number of `i64` parameters each takes after the
/// frame pointer.
pub const HELPERS: [(&str, usize); 6] = [
    ("hk_rt_const", 1),
    ("hk_rt_bool", 1),
    ("hk_rt_truthy", 1),
    ("hk_rt_binary", 3),
    ("hk_rt_call", 2 + MAX_CALL_ARGS),
    ("hk_rt_raise", 1),
];

/// Value storage for one invocation of a native action.
pub struct Frame<'a> {
    host: &'a dyn Host,
    registry: &'a ModuleRegistry,
    constants: &'a [Value],
    failures: &'a [RuntimeError],
    values: Vec<Value>,
    error: Option<RuntimeError>,
}

impl<'a> Frame<'a> {
    pub fn new(
        host: &'a dyn Host,
        registry: &'a ModuleRegistry,
        constants: &'a [Value],
        failures: &'a [RuntimeError],
    ) -> Self {
        Frame {
            host,
            registry,
            constants,
            failures,
            values: vec![Value::Null],
            error: None,
        }
    }

    fn push(&mut self, value: Value) -> i64 {
        self.values.push(value);
        (self.values.len() - 1) as i64
    }

    fn get(&self, handle: i64) -> Value {
        usize::try_from(handle)
            .ok()
            .and_then(|i| self.values.get(i))
            .cloned()
            .unwrap_or_default()
    }

    fn fail(&mut self, error: RuntimeError) -> i64 {
        self.error = Some(error);
        FAILED
    }

    /// Turns the handle returned by the action into its result.
    pub fn finish(mut self, handle: i64) -> Result<Value, RuntimeError> {
        if handle == FAILED {
            return Err(self
                .error
                .take()
                .unwrap_or_else(|| RuntimeError::Host("native action aborted".to_string())));
        }
        Ok(self.get(handle))
    }
}

/// Makes the helpers resolvable by name from generated code.
pub fn register_symbols(builder: &mut JITBuilder) {
    builder.symbol("hk_rt_const", hk_rt_const as *const u8);
    builder.symbol("hk_rt_bool", hk_rt_bool as *const u8);
    builder.symbol("hk_rt_truthy", hk_rt_truthy as *const u8);
    builder.symbol("hk_rt_binary", hk_rt_binary as *const u8);
    builder.symbol("hk_rt_call", hk_rt_call as *const u8);
    builder.symbol("hk_rt_raise", hk_rt_raise as *const u8);
}

/// Loads constant `index` of the action's pool.
///
/// # Safety
/// `frame` must point to the live frame of the current invocation.
pub unsafe extern "C" fn hk_rt_const(frame: *mut Frame<'_>, index: i64) -> i64 {
    let frame = unsafe { &mut *frame };
    let value = usize::try_from(index)
        .ok()
        .and_then(|i| frame.constants.get(i))
        .cloned()
        .unwrap_or_default();
    frame.push(value)
}

/// # Safety
/// `frame` must point to the live frame of the current invocation.
pub unsafe extern "C" fn hk_rt_bool(frame: *mut Frame<'_>, flag: i64) -> i64 {
    let frame = unsafe { &mut *frame };
    frame.push(Value::Boolean(flag != 0))
}

/// Truthiness of a handle as 0 or 1.
///
/// # Safety
/// `frame` must point to the live frame of the current invocation.
pub unsafe extern "C" fn hk_rt_truthy(frame: *mut Frame<'_>, handle: i64) -> i64 {
    let frame = unsafe { &*frame };
    frame.get(handle).as_bool() as i64
}

/// # Safety
/// `frame` must point to the live frame of the current invocation.
pub unsafe extern "C" fn hk_rt_binary(frame: *mut Frame<'_>, op: i64, left: i64, right: i64) -> i64 {
    let frame = unsafe { &mut *frame };
    let Some(op) = BinOp::from_code(op) else {
        return frame.fail(RuntimeError::Host(format!("invalid operator code {}", op)));
    };
    match apply_binop(op, &frame.get(left), &frame.get(right)) {
        Ok(value) => frame.push(value),
        Err(e) => frame.fail(e),
    }
}

/// Calls builtin `id` with the first `argc` of the argument handles.
///
/// # Safety
/// `frame` must point to the live frame of the current invocation.
pub unsafe extern "C" fn hk_rt_call(
    frame: *mut Frame<'_>,
    id: i64,
    argc: i64,
    a0: i64,
    a1: i64,
    a2: i64,
) -> i64 {
    let frame = unsafe { &mut *frame };
    let builtin = usize::try_from(id).ok().and_then(|i| frame.registry.get(i)).copied();
    let Some(builtin) = builtin else {
        return frame.fail(RuntimeError::Host(format!("invalid builtin id {}", id)));
    };

    let argc = usize::try_from(argc).unwrap_or(0).min(MAX_CALL_ARGS);
    let args: Vec<Value> = [a0, a1, a2][..argc].iter().map(|h| frame.get(*h)).collect();

    match builtin.call(frame.host, &args) {
        Ok(value) => frame.push(value),
        Err(e) => frame.fail(e),
    }
}

/// Fails with entry `index` of the action's failure pool. Emitted where a
/// name only turns out to be unbound at run time.
///
/// # Safety
/// `frame` must point to the live frame of the current invocation.
pub unsafe extern "C" fn hk_rt_raise(frame: *mut Frame<'_>, index: i64) -> i64 {
    let frame = unsafe { &mut *frame };
    let error = usize::try_from(index)
        .ok()
        .and_then(|i| frame.failures.get(i))
        .cloned()
        .unwrap_or_else(|| RuntimeError::Host(format!("invalid failure index {}", index)));
    frame.fail(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;

    #[test]
    fn test_helpers_share_operator_semantics() {
        let host = RecordingHost::new();
        let registry = ModuleRegistry::standard();
        let constants = [Value::Integer(1), Value::Integer(0)];
        let mut frame = Frame::new(&host, &registry, &constants, &[]);

        let one = unsafe { hk_rt_const(&mut frame, 0) };
        let zero = unsafe { hk_rt_const(&mut frame, 1) };
        let failed = unsafe { hk_rt_binary(&mut frame, BinOp::Divide.code(), one, zero) };

        assert_eq!(failed, FAILED);
        assert_eq!(frame.finish(failed), Err(RuntimeError::DivisionByZero));
    }

    #[test]
    fn test_call_checks_arity() {
        let host = RecordingHost::new().with_clipboard("abc");
        let registry = ModuleRegistry::standard();
        let id = registry.lookup("clipboard", "out").unwrap().id as i64;
        let mut frame = Frame::new(&host, &registry, &[], &[]);

        let handle = unsafe { hk_rt_call(&mut frame, id, 0, 0, 0, 0) };
        assert_eq!(frame.get(handle), Value::from("abc"));
        assert_eq!(frame.get(NULL_HANDLE), Value::Null);
    }

    #[test]
    fn test_raise_reports_pooled_error() {
        let host = RecordingHost::new();
        let registry = ModuleRegistry::standard();
        let failures = [RuntimeError::UnknownIdentifier("y".into())];
        let mut frame = Frame::new(&host, &registry, &[], &failures);

        let handle = unsafe { hk_rt_raise(&mut frame, 0) };
        assert_eq!(handle, FAILED);
        assert_eq!(frame.finish(handle), Err(RuntimeError::UnknownIdentifier("y".into())));
    }
}
