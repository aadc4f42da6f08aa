//! CLI support for hotkey-lang
//!
//! Provides programmatic access to the `hotkey` command's operations so
//! they can be embedded in other tools (editors, launchers) without going
//! through the binary.

mod check;
mod compile;
mod convert;
mod docs;
mod run;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use compile::{CompileOptions, execute_compile};
pub use convert::{json_to_value, value_to_json};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use run::{RunOptions, RunResult, TriggerOutcome, execute_run};

use std::io;

use crate::{config::ConfigError, engine::EngineError, parser::SyntaxError};

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Script does not parse
    Syntax(SyntaxError),
    /// Loading, compiling or running failed
    Engine(EngineError),
    /// Config file unreadable or invalid
    Config(ConfigError),
    /// JSON output error
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// No script provided
    NoInput,
    /// Unknown documentation category
    UnknownCategory(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Syntax(e) => write!(f, "Syntax error: {}", e),
            CliError::Engine(e) => write!(f, "Error: {}", e),
            CliError::Config(e) => write!(f, "Config error: {}", e),
            CliError::Json(e) => write!(f, "JSON error: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => write!(f, "No script provided. Pass a file or pipe a script to stdin."),
            CliError::UnknownCategory(c) => {
                write!(f, "Unknown category: '{}'\nRun 'hotkey docs' to see available categories.", c)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Syntax(e) => Some(e),
            CliError::Engine(e) => Some(e),
            CliError::Config(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SyntaxError> for CliError {
    fn from(e: SyntaxError) -> Self {
        CliError::Syntax(e)
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Syntax(e) => CliError::Syntax(e),
            other => CliError::Engine(other),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
