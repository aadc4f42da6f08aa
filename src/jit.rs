use std::{collections::BTreeMap, fmt, sync::Arc};

use crate::{
    ast::{Program, Statement},
    codegen::{CodeGenerator, CompileError, NativeFunction},
    environment::ModuleRegistry,
    error::RuntimeError,
    hotkey::normalize,
    host::Host,
    value::Value,
};

/// A hotkey bound to a native function.
pub struct CompiledHotkey {
    /// Hotkey text as written in the script
    pub source: String,
    pub function: NativeFunction,
}

/// A binding that failed to compile.
#[derive(Debug)]
pub struct BindFailure {
    pub hotkey: String,
    pub line: usize,
    pub error: CompileError,
}

impl fmt::Display for BindFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.hotkey, self.error)
    }
}

/// What [`JitManager::compile_script`] did with each top-level statement.
#[derive(Debug, Default)]
pub struct ScriptReport {
    /// Normalized hotkeys that are now bound
    pub bound: Vec<String>,
    /// Top-level statements that are not bindings, rendered
    pub skipped: Vec<String>,
    pub failed: Vec<BindFailure>,
}

impl ScriptReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Registry of compiled hotkeys.
///
/// Keys are normalized combinations, so `Win+1` and `#1` share an entry.
/// Binding an existing key replaces its function (last-bind-wins); entries
/// stay until [`unbind`](Self::unbind) or until the manager is dropped.
pub struct JitManager {
    generator: CodeGenerator,
    host: Arc<dyn Host>,
    compiled: BTreeMap<String, CompiledHotkey>,
}

impl JitManager {
    pub fn new(host: Arc<dyn Host>) -> Self {
        JitManager::with_modules(host, Arc::new(ModuleRegistry::standard()))
    }

    pub fn with_modules(host: Arc<dyn Host>, modules: Arc<ModuleRegistry>) -> Self {
        JitManager {
            generator: CodeGenerator::new(modules),
            host,
            compiled: BTreeMap::new(),
        }
    }

    pub fn generator(&self) -> &CodeGenerator {
        &self.generator
    }

    /// Compiles `action` and binds it to `hotkey`. Returns the normalized key.
    ///
    /// On error the previous binding, if any, is left in place.
    pub fn bind(&mut self, hotkey: &str, action: &Statement) -> Result<String, CompileError> {
        let key = normalize(hotkey);
        let function = self.generator.compile_statement(action)?;

        let entry = CompiledHotkey {
            source: hotkey.to_string(),
            function,
        };
        if self.compiled.insert(key.clone(), entry).is_some() {
            log::info!("rebound {} (native, previous function released)", key);
        } else {
            log::info!("bound {} (native)", key);
        }
        self.host.register_hotkey(&key);
        Ok(key)
    }

    /// Invokes the function bound to `hotkey`.
    ///
    /// Returns `None` when nothing is bound. A failing invocation is logged
    /// and yields [`Value::Null`].
    pub fn trigger(&self, hotkey: &str) -> Option<Value> {
        match self.invoke(hotkey)? {
            Ok(value) => Some(value),
            Err(e) => {
                log::error!("hotkey {} failed: {}", normalize(hotkey), e);
                Some(Value::Null)
            }
        }
    }

    /// Like [`trigger`](Self::trigger) but hands the runtime error back.
    pub fn invoke(&self, hotkey: &str) -> Option<Result<Value, RuntimeError>> {
        let key = normalize(hotkey);
        match self.compiled.get(&key) {
            Some(entry) => {
                log::debug!("triggering {} (bound as {})", key, entry.source);
                Some(entry.function.invoke(self.host.as_ref()))
            }
            None => {
                log::warn!("no compiled binding for {}", key);
                None
            }
        }
    }

    /// Binds every top-level hotkey binding of `program`.
    ///
    /// Each binding compiles independently: a failure is recorded in the
    /// report and the remaining bindings still go ahead. Other top-level
    /// statements are skipped.
    pub fn compile_script(&mut self, program: &Program) -> ScriptReport {
        let mut report = ScriptReport::default();

        for stmt in &program.statements {
            let Statement::HotkeyBinding { action, line, .. } = stmt else {
                log::warn!("skipping top-level statement in compiled mode: {}", stmt);
                report.skipped.push(stmt.to_string());
                continue;
            };
            let hotkey = stmt.hotkey_text().unwrap_or_default().to_string();

            match self.bind(&hotkey, action) {
                Ok(key) => report.bound.push(key),
                Err(error) => {
                    let failure = BindFailure {
                        hotkey,
                        line: *line,
                        error,
                    };
                    log::error!("failed to compile binding at {}", failure);
                    report.failed.push(failure);
                }
            }
        }
        report
    }

    /// Removes a binding. Returns whether one existed.
    pub fn unbind(&mut self, hotkey: &str) -> bool {
        let key = normalize(hotkey);
        let removed = self.compiled.remove(&key).is_some();
        if removed {
            log::info!("unbound {}", key);
            self.host.unregister_hotkey(&key);
        }
        removed
    }

    pub fn is_bound(&self, hotkey: &str) -> bool {
        self.compiled.contains_key(&normalize(hotkey))
    }

    /// Normalized combinations currently bound, sorted.
    pub fn bound_hotkeys(&self) -> Vec<String> {
        self.compiled.keys().cloned().collect()
    }
}
