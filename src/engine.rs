//! Script loading and execution-mode dispatch.
//!
//! [`Engine`] ties the pipeline together: it reads scripts, parses them and
//! hands the result to either the [`Interpreter`] or the [`JitManager`]
//! depending on the [`ExecutionMode`]. It also produces and loads
//! ahead-of-time bundles.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};

use crate::{
    ast::{Program, Statement},
    codegen::CompileError,
    config::EngineConfig,
    environment::{Environment, ModuleRegistry},
    error::RuntimeError,
    hotkey::normalize,
    host::Host,
    interpreter::Interpreter,
    jit::{BindFailure, JitManager},
    parser::{SyntaxError, parse_source},
    value::Value,
};

/// Format tag written into every bundle.
pub const BUNDLE_FORMAT: &str = "hotkey-bundle";
pub const BUNDLE_VERSION: u32 = 1;

/// How hotkey actions are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ExecutionMode {
    /// Tree-walking evaluation
    #[default]
    Interpreter,
    /// Native code compiled at load time
    Jit,
    /// Native code, verified up front and loadable from a bundle
    AheadOfTime,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExecutionMode::Interpreter => "interpreter",
            ExecutionMode::Jit => "jit",
            ExecutionMode::AheadOfTime => "ahead-of-time",
        })
    }
}

/// One verified binding recorded in a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleBinding {
    pub hotkey: String,
    pub normalized: String,
    pub line: usize,
}

/// Ahead-of-time artifact: a script whose bindings all compiled natively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub format: String,
    pub version: u32,
    pub bindings: Vec<BundleBinding>,
    pub source: String,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error at {0}")]
    Syntax(#[from] SyntaxError),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("{} hotkey binding(s) failed to compile; first at {}", .0.len(), first_failure(.0))]
    Bindings(Vec<BindFailure>),

    #[error("operation requires ahead-of-time mode (current mode: {0})")]
    WrongMode(ExecutionMode),

    #[error("invalid bundle: {0}")]
    Bundle(String),

    #[error("bundle serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

fn first_failure(failures: &[BindFailure]) -> String {
    failures
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

fn read_file(path: &Path) -> Result<String, EngineError> {
    fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Splits a program into its hotkey bindings and everything else.
fn split_bindings(program: Program) -> (Program, Vec<Statement>) {
    let (bindings, rest): (Vec<_>, Vec<_>) = program
        .statements
        .into_iter()
        .partition(|stmt| matches!(stmt, Statement::HotkeyBinding { .. }));
    (Program::new(bindings), rest)
}

/// Orchestrates parsing and execution for one host.
///
/// The interpreter environment persists across calls to
/// [`execute_code`](Self::execute_code), so variables and functions defined
/// by one snippet are visible to the next.
pub struct Engine {
    mode: ExecutionMode,
    host: Arc<dyn Host>,
    interpreter: Interpreter,
    jit: JitManager,
    environment: Environment,
}

impl Engine {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Engine::with_config(host, &EngineConfig::default())
    }

    pub fn with_config(host: Arc<dyn Host>, config: &EngineConfig) -> Self {
        let modules = Arc::new(ModuleRegistry::standard());
        let interpreter = Interpreter::with_modules(Arc::clone(&host), Arc::clone(&modules))
            .with_max_call_depth(config.max_call_depth);
        let jit = JitManager::with_modules(Arc::clone(&host), Arc::clone(&modules));

        Engine {
            mode: config.mode,
            host,
            interpreter,
            jit,
            environment: Environment::new(modules),
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn set_execution_mode(&mut self, mode: ExecutionMode) {
        if mode != self.mode {
            log::info!("execution mode: {} -> {}", self.mode, mode);
        }
        self.mode = mode;
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    /// Parses and runs `source`.
    ///
    /// In interpreter mode every statement is evaluated in order. In the
    /// compiled modes the hotkey bindings are compiled first (all of them,
    /// even when one fails), then the remaining top-level statements run as
    /// one native function.
    pub fn execute_code(&mut self, source: &str) -> Result<Value, EngineError> {
        let program = parse_source(source)?;

        match self.mode {
            ExecutionMode::Interpreter => {
                Ok(self.interpreter.evaluate(&program, &mut self.environment)?)
            }
            ExecutionMode::Jit | ExecutionMode::AheadOfTime => {
                let (bindings, rest) = split_bindings(program);
                let report = self.jit.compile_script(&bindings);
                if !report.is_success() {
                    return Err(EngineError::Bindings(report.failed));
                }
                if rest.is_empty() {
                    return Ok(Value::Null);
                }

                let function = self
                    .jit
                    .generator()
                    .compile_statement(&Statement::Block(rest))?;
                Ok(function.invoke(self.host.as_ref())?)
            }
        }
    }

    /// Registers the hotkey bindings of `source` without running anything
    /// else. Returns the normalized keys, in source order.
    pub fn register_hotkeys_from_code(&mut self, source: &str) -> Result<Vec<String>, EngineError> {
        let (bindings, rest) = split_bindings(parse_source(source)?);
        for stmt in &rest {
            log::warn!("ignoring non-binding statement: {}", stmt);
        }

        match self.mode {
            ExecutionMode::Interpreter => {
                let mut keys = Vec::with_capacity(bindings.statements.len());
                for stmt in &bindings.statements {
                    self.interpreter
                        .eval_statement_value(stmt, &mut self.environment)?;
                    keys.push(normalize(stmt.hotkey_text().unwrap_or_default()));
                }
                Ok(keys)
            }
            ExecutionMode::Jit | ExecutionMode::AheadOfTime => {
                let report = self.jit.compile_script(&bindings);
                if !report.is_success() {
                    return Err(EngineError::Bindings(report.failed));
                }
                Ok(report.bound)
            }
        }
    }

    /// Runs a script file, or loads it if it is a bundle.
    pub fn run_script(&mut self, path: impl AsRef<Path>) -> Result<Value, EngineError> {
        let path = path.as_ref();
        let content = read_file(path)?;
        log::info!("running {} in {} mode", path.display(), self.mode);

        if let Ok(bundle) = serde_json::from_str::<Bundle>(&content) {
            self.install_bundle(bundle)?;
            return Ok(Value::Null);
        }
        self.execute_code(&content)
    }

    /// Runs the action bound to `hotkey` with the backend of the current
    /// mode. `None` when nothing is bound there.
    pub fn trigger(&mut self, hotkey: &str) -> Option<Value> {
        match self.mode {
            ExecutionMode::Interpreter => self.interpreter.trigger(hotkey),
            ExecutionMode::Jit | ExecutionMode::AheadOfTime => self.jit.trigger(hotkey),
        }
    }

    /// Like [`trigger`](Self::trigger) but hands the runtime error back.
    pub fn invoke(&mut self, hotkey: &str) -> Option<Result<Value, RuntimeError>> {
        match self.mode {
            ExecutionMode::Interpreter => self.interpreter.invoke(hotkey),
            ExecutionMode::Jit | ExecutionMode::AheadOfTime => self.jit.invoke(hotkey),
        }
    }

    pub fn unbind(&mut self, hotkey: &str) -> bool {
        match self.mode {
            ExecutionMode::Interpreter => self.interpreter.unbind(hotkey),
            ExecutionMode::Jit | ExecutionMode::AheadOfTime => self.jit.unbind(hotkey),
        }
    }

    /// Hotkeys bound in the backend of the current mode, sorted.
    pub fn bound_hotkeys(&self) -> Vec<String> {
        match self.mode {
            ExecutionMode::Interpreter => self.interpreter.bindings(),
            ExecutionMode::Jit | ExecutionMode::AheadOfTime => self.jit.bound_hotkeys(),
        }
    }

    /// Compiles every binding of `input` natively and writes a bundle to
    /// `output`.
    ///
    /// Nothing is written unless all bindings compile. Only available in
    /// [`ExecutionMode::AheadOfTime`].
    pub fn compile_to_executable(
        &mut self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<Bundle, EngineError> {
        if self.mode != ExecutionMode::AheadOfTime {
            return Err(EngineError::WrongMode(self.mode));
        }
        let (input, output) = (input.as_ref(), output.as_ref());
        let source = read_file(input)?;
        let (bindings, rest) = split_bindings(parse_source(&source)?);
        if !rest.is_empty() {
            log::warn!(
                "{} top-level statement(s) in {} are not bindings and will not run from the bundle",
                rest.len(),
                input.display()
            );
        }

        let mut verified = Vec::new();
        let mut failures = Vec::new();
        for stmt in &bindings.statements {
            let Statement::HotkeyBinding { action, line, .. } = stmt else {
                continue;
            };
            let hotkey = stmt.hotkey_text().unwrap_or_default().to_string();
            match self.jit.generator().compile_statement(action) {
                Ok(_) => verified.push(BundleBinding {
                    normalized: normalize(&hotkey),
                    hotkey,
                    line: *line,
                }),
                Err(error) => failures.push(BindFailure {
                    hotkey,
                    line: *line,
                    error,
                }),
            }
        }
        if !failures.is_empty() {
            return Err(EngineError::Bindings(failures));
        }

        let bundle = Bundle {
            format: BUNDLE_FORMAT.to_string(),
            version: BUNDLE_VERSION,
            bindings: verified,
            source,
        };
        let json = serde_json::to_string_pretty(&bundle)?;
        fs::write(output, json).map_err(|source| EngineError::Io {
            path: output.to_path_buf(),
            source,
        })?;

        log::info!(
            "wrote {} with {} binding(s)",
            output.display(),
            bundle.bindings.len()
        );
        Ok(bundle)
    }

    /// Loads a bundle written by
    /// [`compile_to_executable`](Self::compile_to_executable) and binds its
    /// hotkeys natively. Returns the bound keys.
    pub fn load_bundle(&mut self, path: impl AsRef<Path>) -> Result<Vec<String>, EngineError> {
        let content = read_file(path.as_ref())?;
        let bundle: Bundle = serde_json::from_str(&content)?;
        self.install_bundle(bundle)
    }

    fn install_bundle(&mut self, bundle: Bundle) -> Result<Vec<String>, EngineError> {
        if bundle.format != BUNDLE_FORMAT {
            return Err(EngineError::Bundle(format!(
                "unexpected format tag '{}'",
                bundle.format
            )));
        }
        if bundle.version != BUNDLE_VERSION {
            return Err(EngineError::Bundle(format!(
                "unsupported version {}",
                bundle.version
            )));
        }

        let (bindings, _) = split_bindings(parse_source(&bundle.source)?);
        let expected: Vec<&str> = bundle.bindings.iter().map(|b| b.normalized.as_str()).collect();
        let found: Vec<String> = bindings
            .statements
            .iter()
            .map(|stmt| normalize(stmt.hotkey_text().unwrap_or_default()))
            .collect();
        if expected != found {
            return Err(EngineError::Bundle(
                "binding list does not match the embedded source".to_string(),
            ));
        }

        if self.mode == ExecutionMode::Interpreter {
            self.set_execution_mode(ExecutionMode::AheadOfTime);
        }
        let report = self.jit.compile_script(&bindings);
        if !report.is_success() {
            return Err(EngineError::Bindings(report.failed));
        }
        Ok(report.bound)
    }
}
