use std::{collections::BTreeMap, sync::Arc};

use crate::{
    ast::{BinOp, Expr, FunctionDecl, Program, Statement},
    environment::{Builtin, Environment, ModuleRegistry},
    error::RuntimeError,
    hotkey::normalize,
    host::Host,
    ops::apply_binop,
    value::Value,
};

/// Default limit on nested user-function calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// Outcome of a statement: either fall through with a value or unwind to
/// the enclosing function or action.
#[derive(Debug)]
enum Flow {
    Normal(Value),
    Return(Value),
}

impl Flow {
    fn into_value(self) -> Value {
        match self {
            Flow::Normal(v) | Flow::Return(v) => v,
        }
    }
}

/// Something a call or pipeline stage can invoke.
#[derive(Debug, Clone)]
enum Callable {
    Builtin(Builtin),
    User(Arc<FunctionDecl>),
}

impl Callable {
    fn arity(&self) -> usize {
        match self {
            Callable::Builtin(b) => b.arity,
            Callable::User(decl) => decl.params.len(),
        }
    }
}

/// A hotkey action registered by the interpreter, closed over the scope
/// that was current when the binding statement ran.
#[derive(Debug, Clone)]
struct InterpretedBinding {
    source: String,
    action: Arc<Statement>,
    environment: Environment,
}

/// The tree-walking evaluator.
///
/// Evaluates programs statement by statement against an [`Environment`] and
/// keeps the hotkey bindings those programs declare. Bindings are keyed by
/// normalized combination; binding the same combination again replaces the
/// earlier action.
pub struct Interpreter {
    host: Arc<dyn Host>,
    modules: Arc<ModuleRegistry>,
    bindings: BTreeMap<String, InterpretedBinding>,
    max_call_depth: usize,
    depth: usize,
}

impl Interpreter {
    /// Creates an interpreter over the standard library.
    pub fn new(host: Arc<dyn Host>) -> Self {
        Interpreter::with_modules(host, Arc::new(ModuleRegistry::standard()))
    }

    pub fn with_modules(host: Arc<dyn Host>, modules: Arc<ModuleRegistry>) -> Self {
        Interpreter {
            host,
            modules,
            bindings: BTreeMap::new(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            depth: 0,
        }
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// A fresh, empty environment sharing this interpreter's modules.
    pub fn environment(&self) -> Environment {
        Environment::new(Arc::clone(&self.modules))
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    /// Evaluates a complete program.
    ///
    /// Statements run in order against `env`. The result is the value of the
    /// last statement, or of the first top-level `return`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hotkey_lang::{Interpreter, RecordingHost, Value};
    /// use hotkey_lang::parser::parse_source;
    /// use std::sync::Arc;
    ///
    /// let program = parse_source("let x = 2\nx + 3 * 4").unwrap();
    /// let mut interpreter = Interpreter::new(Arc::new(RecordingHost::new()));
    /// let mut env = interpreter.environment();
    ///
    /// assert_eq!(interpreter.evaluate(&program, &mut env).unwrap(), Value::Integer(14));
    /// ```
    pub fn evaluate(&mut self, program: &Program, env: &mut Environment) -> Result<Value, RuntimeError> {
        log::debug!("evaluating {} statement(s)", program.statements.len());
        let mut last = Value::Null;

        for stmt in &program.statements {
            match self.eval_statement(stmt, env)? {
                Flow::Normal(value) => last = value,
                Flow::Return(value) => return Ok(value),
            }
        }
        Ok(last)
    }

    /// Evaluates a single statement, unwrapping any `return`.
    pub fn eval_statement_value(
        &mut self,
        stmt: &Statement,
        env: &mut Environment,
    ) -> Result<Value, RuntimeError> {
        self.eval_statement(stmt, env).map(Flow::into_value)
    }

    /// Evaluates a single expression.
    ///
    /// # Examples
    ///
    /// ```
    /// use hotkey_lang::{Interpreter, RecordingHost, Value};
    /// use hotkey_lang::ast::{BinOp, Expr};
    /// use std::sync::Arc;
    ///
    /// let mut interpreter = Interpreter::new(Arc::new(RecordingHost::new()));
    /// let mut env = interpreter.environment();
    /// let expr = Expr::binary(Expr::Number(7.0), BinOp::Divide, Expr::Number(2.0));
    ///
    /// assert_eq!(interpreter.eval_expression(&expr, &mut env).unwrap(), Value::Float(3.5));
    /// ```
    pub fn eval_expression(&mut self, expr: &Expr, env: &mut Environment) -> Result<Value, RuntimeError> {
        self.eval_expr(expr, env)
    }

    /// Runs the action bound to `hotkey`.
    ///
    /// Returns `None` when nothing is bound. A failing action is logged and
    /// yields [`Value::Null`]; it never propagates to the caller.
    pub fn trigger(&mut self, hotkey: &str) -> Option<Value> {
        match self.invoke(hotkey)? {
            Ok(value) => Some(value),
            Err(e) => {
                log::error!("hotkey {} failed: {}", normalize(hotkey), e);
                Some(Value::Null)
            }
        }
    }

    /// Like [`trigger`](Self::trigger) but hands the runtime error back.
    pub fn invoke(&mut self, hotkey: &str) -> Option<Result<Value, RuntimeError>> {
        let key = normalize(hotkey);
        let Some(binding) = self.bindings.get(&key) else {
            log::warn!("no interpreted binding for {}", key);
            return None;
        };

        // Every trigger starts from the captured scope, untouched by earlier runs.
        let mut env = binding.environment.clone();
        let action = Arc::clone(&binding.action);
        log::debug!("triggering {} (bound as {})", key, binding.source);

        self.depth = 0;
        Some(self.eval_statement(&action, &mut env).map(Flow::into_value))
    }

    /// Removes a binding. Returns whether one existed.
    pub fn unbind(&mut self, hotkey: &str) -> bool {
        let key = normalize(hotkey);
        let removed = self.bindings.remove(&key).is_some();
        if removed {
            log::info!("unbound {}", key);
            self.host.unregister_hotkey(&key);
        }
        removed
    }

    pub fn is_bound(&self, hotkey: &str) -> bool {
        self.bindings.contains_key(&normalize(hotkey))
    }

    /// Normalized combinations currently bound, sorted.
    pub fn bindings(&self) -> Vec<String> {
        self.bindings.keys().cloned().collect()
    }

    fn bind(&mut self, hotkey: &str, action: &Statement, env: &Environment) {
        let key = normalize(hotkey);
        let binding = InterpretedBinding {
            source: hotkey.to_string(),
            action: Arc::new(action.clone()),
            environment: env.clone(),
        };

        if self.bindings.insert(key.clone(), binding).is_some() {
            log::info!("rebound {} (previous action replaced)", key);
        } else {
            log::info!("bound {}", key);
        }
        self.host.register_hotkey(&key);
    }

    fn eval_statement(&mut self, stmt: &Statement, env: &mut Environment) -> Result<Flow, RuntimeError> {
        match stmt {
            Statement::HotkeyBinding { hotkey, action, .. } => {
                let text = match hotkey {
                    Expr::Hotkey(text) | Expr::String(text) => text.clone(),
                    other => self.eval_expr(other, env)?.as_string(),
                };
                self.bind(&text, action, env);
                Ok(Flow::Normal(Value::Null))
            }
            Statement::Block(statements) => {
                let mut last = Value::Null;
                for stmt in statements {
                    match self.eval_statement(stmt, env)? {
                        Flow::Normal(value) => last = value,
                        ret @ Flow::Return(_) => return Ok(ret),
                    }
                }
                Ok(Flow::Normal(last))
            }
            Statement::Expression(expr) => Ok(Flow::Normal(self.eval_expr(expr, env)?)),
            Statement::Let { name, value } => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::Null,
                };
                env.set(name.clone(), value.clone());
                Ok(Flow::Normal(value))
            }
            Statement::If {
                condition,
                consequence,
                alternative,
            } => {
                if self.eval_expr(condition, env)?.as_bool() {
                    self.eval_statement(consequence, env)
                } else if let Some(alt) = alternative {
                    self.eval_statement(alt, env)
                } else {
                    Ok(Flow::Normal(Value::Null))
                }
            }
            Statement::While { condition, body } => {
                while self.eval_expr(condition, env)?.as_bool() {
                    if let ret @ Flow::Return(_) = self.eval_statement(body, env)? {
                        return Ok(ret);
                    }
                }
                Ok(Flow::Normal(Value::Null))
            }
            Statement::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }
            Statement::Function(decl) => {
                env.define_function(decl.clone());
                Ok(Flow::Normal(Value::Null))
            }
        }
    }

    fn eval_expr(&mut self, expr: &Expr, env: &mut Environment) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Identifier(name) => {
                if let Some(value) = env.get(name) {
                    return Ok(value.clone());
                }
                // Not a variable: a bare function name is a call with no arguments.
                let callable = self.resolve_callable(expr, env)?;
                self.call(callable, vec![], env)
            }
            Expr::Number(n) => Ok(Value::from_number(*n)),
            Expr::String(s) => Ok(Value::String(s.clone())),
            Expr::Hotkey(text) => Ok(Value::String(text.clone())),
            Expr::Binary { left, op, right } => match op {
                BinOp::And => {
                    if !self.eval_expr(left, env)?.as_bool() {
                        return Ok(Value::Boolean(false));
                    }
                    Ok(Value::Boolean(self.eval_expr(right, env)?.as_bool()))
                }
                BinOp::Or => {
                    if self.eval_expr(left, env)?.as_bool() {
                        return Ok(Value::Boolean(true));
                    }
                    Ok(Value::Boolean(self.eval_expr(right, env)?.as_bool()))
                }
                _ => {
                    let left_val = self.eval_expr(left, env)?;
                    let right_val = self.eval_expr(right, env)?;
                    apply_binop(*op, &left_val, &right_val)
                }
            },
            Expr::Call { callee, args } => {
                let callable = self.resolve_callable(callee, env)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg, env)?);
                }
                self.call(callable, values, env)
            }
            Expr::Member { .. } => {
                let callable = self.resolve_callable(expr, env)?;
                self.call(callable, vec![], env)
            }
            Expr::Pipeline(stages) => {
                let Some((first, rest)) = stages.split_first() else {
                    return Ok(Value::Null);
                };
                let mut acc = self.eval_expr(first, env)?;
                for stage in rest {
                    acc = self.apply_stage(stage, acc, env)?;
                }
                Ok(acc)
            }
        }
    }

    /// Feeds the running pipeline value into one stage.
    fn apply_stage(&mut self, stage: &Expr, input: Value, env: &mut Environment) -> Result<Value, RuntimeError> {
        match stage {
            Expr::Call { callee, args } => {
                let callable = self.resolve_callable(callee, env)?;
                let mut values = Vec::with_capacity(args.len() + 1);
                values.push(input);
                for arg in args {
                    values.push(self.eval_expr(arg, env)?);
                }
                self.call(callable, values, env)
            }
            Expr::Identifier(_) | Expr::Member { .. } => {
                let callable = self.resolve_callable(stage, env)?;
                let args = if callable.arity() == 0 { vec![] } else { vec![input] };
                self.call(callable, args, env)
            }
            other => Err(RuntimeError::InvalidPipelineStage(other.to_string())),
        }
    }

    fn resolve_callable(&self, callee: &Expr, env: &Environment) -> Result<Callable, RuntimeError> {
        match callee {
            Expr::Identifier(name) => {
                if let Some(decl) = env.function(name) {
                    return Ok(Callable::User(decl));
                }
                self.modules
                    .lookup_global(name)
                    .map(|b| Callable::Builtin(*b))
                    .ok_or_else(|| RuntimeError::UnknownIdentifier(name.clone()))
            }
            Expr::Member { object, property } => match (object.as_ref(), property.as_ref()) {
                (Expr::Identifier(module), Expr::Identifier(function)) => self
                    .modules
                    .lookup(module, function)
                    .map(|b| Callable::Builtin(*b)),
                (object, _) => Err(RuntimeError::UnknownModule(object.to_string())),
            },
            other => Err(RuntimeError::UnknownIdentifier(other.to_string())),
        }
    }

    fn call(&mut self, callable: Callable, args: Vec<Value>, env: &Environment) -> Result<Value, RuntimeError> {
        match callable {
            Callable::Builtin(builtin) => builtin.call(self.host.as_ref(), &args),
            Callable::User(decl) => {
                if args.len() != decl.params.len() {
                    return Err(RuntimeError::ArityMismatch {
                        function: decl.name.clone(),
                        expected: decl.params.len(),
                        found: args.len(),
                    });
                }
                if self.depth >= self.max_call_depth {
                    return Err(RuntimeError::CallDepthExceeded(self.max_call_depth));
                }

                let mut scope = env.clone();
                for (param, value) in decl.params.iter().zip(args) {
                    scope.set(param.clone(), value);
                }

                self.depth += 1;
                let result = self.eval_statement(&decl.body, &mut scope);
                self.depth -= 1;
                result.map(Flow::into_value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{host::RecordingHost, parser::parse_source};

    fn run(source: &str) -> Result<Value, RuntimeError> {
        let program = parse_source(source).unwrap();
        let mut interpreter = Interpreter::new(Arc::new(RecordingHost::new()));
        let mut env = interpreter.environment();
        interpreter.evaluate(&program, &mut env)
    }

    #[test]
    fn test_statement_values() {
        assert_eq!(run("").unwrap(), Value::Null);
        assert_eq!(run("let x = 3").unwrap(), Value::Integer(3));
        assert_eq!(run("if 0 { 1 }").unwrap(), Value::Null);
        assert_eq!(run("{ 1; 2 }").unwrap(), Value::Integer(2));
    }

    #[test]
    fn test_short_circuit() {
        // The right side would fail if evaluated.
        assert_eq!(run("0 and missing").unwrap(), Value::Boolean(false));
        assert_eq!(run("1 or missing").unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_call_depth() {
        let interpreter_result = {
            let program = parse_source("fn loop(n) { return loop(n + 1) }\nloop(0)").unwrap();
            let mut interpreter =
                Interpreter::new(Arc::new(RecordingHost::new())).with_max_call_depth(16);
            let mut env = interpreter.environment();
            interpreter.evaluate(&program, &mut env)
        };
        assert_eq!(interpreter_result, Err(RuntimeError::CallDepthExceeded(16)));
    }
}
