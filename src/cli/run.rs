//! Run hotkey scripts against the in-memory host

use std::{path::PathBuf, sync::Arc};

use super::{CliError, value_to_json};
use crate::{
    config::EngineConfig,
    engine::{Engine, ExecutionMode},
    host::Host,
};

/// Options for the run and eval commands
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Script file; takes precedence over `source`
    pub path: Option<PathBuf>,
    /// Script source
    pub source: Option<String>,
    /// Overrides the configured mode
    pub mode: Option<ExecutionMode>,
    /// Hotkeys to press after loading, in order
    pub triggers: Vec<String>,
    pub config: EngineConfig,
}

/// What happened to one simulated key press
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerOutcome {
    pub hotkey: String,
    /// `None` when nothing was bound to the hotkey
    pub result: Option<serde_json::Value>,
}

/// Result of a run operation
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// Value of the script's last top-level statement
    pub value: serde_json::Value,
    /// Hotkeys bound after loading, sorted
    pub bound: Vec<String>,
    pub triggered: Vec<TriggerOutcome>,
    /// Keystrokes the script sent, in order
    pub sent: Vec<String>,
    pub clipboard: String,
}

/// Load a script, then press each requested hotkey
pub fn execute_run(options: &RunOptions) -> Result<RunResult, CliError> {
    let host = Arc::new(options.config.host.build());
    let mut engine = Engine::with_config(Arc::clone(&host) as Arc<dyn Host>, &options.config);
    if let Some(mode) = options.mode {
        engine.set_execution_mode(mode);
    }

    let value = match (&options.path, &options.source) {
        (Some(path), _) => engine.run_script(path)?,
        (None, Some(source)) => engine.execute_code(source)?,
        (None, None) => return Err(CliError::NoInput),
    };

    let triggered = options
        .triggers
        .iter()
        .map(|hotkey| TriggerOutcome {
            hotkey: hotkey.clone(),
            result: engine.trigger(hotkey).map(value_to_json),
        })
        .collect();

    Ok(RunResult {
        value: value_to_json(value),
        bound: engine.bound_hotkeys(),
        triggered,
        sent: host.sent(),
        clipboard: host.clipboard(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_and_trigger() {
        let options = RunOptions {
            source: Some("F1 => send \"Hello World!\"".to_string()),
            triggers: vec!["f1".to_string(), "F2".to_string()],
            ..Default::default()
        };
        let result = execute_run(&options).unwrap();
        assert_eq!(result.bound, vec!["F1"]);
        assert_eq!(result.sent, vec!["Hello World!"]);
        assert_eq!(result.triggered[0].result, Some(serde_json::Value::Null));
        assert_eq!(result.triggered[1].result, None);
    }

    #[test]
    fn test_run_without_input() {
        assert!(matches!(
            execute_run(&RunOptions::default()),
            Err(CliError::NoInput)
        ));
    }
}
