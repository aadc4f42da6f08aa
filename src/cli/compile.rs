//! Ahead-of-time compilation of hotkey scripts into bundles

use std::{path::PathBuf, sync::Arc};

use super::CliError;
use crate::{
    config::EngineConfig,
    engine::{Bundle, Engine, ExecutionMode},
    host::{Host, RecordingHost},
};

/// Options for the compile command
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub config: EngineConfig,
}

/// Verify every binding of a script natively and write the bundle
pub fn execute_compile(options: &CompileOptions) -> Result<Bundle, CliError> {
    let host: Arc<dyn Host> = Arc::new(RecordingHost::new());
    let mut engine = Engine::with_config(host, &options.config);
    engine.set_execution_mode(ExecutionMode::AheadOfTime);

    Ok(engine.compile_to_executable(&options.input, &options.output)?)
}
