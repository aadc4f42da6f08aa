/// Errors raised while running a hotkey action or script.
///
/// Both execution backends report the same variant for the same failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    /// Name that is neither a variable nor a function
    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),

    /// `module.function` where the module exists but the function does not
    #[error("unknown function '{module}.{function}'")]
    UnknownFunction { module: String, function: String },

    #[error("unknown module '{0}'")]
    UnknownModule(String),

    /// Pipeline stage that is not a call, identifier or member path
    #[error("invalid pipeline stage: {0}")]
    InvalidPipelineStage(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("'{function}' expects {expected} argument(s), found {found}")]
    ArityMismatch {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("maximum call depth of {0} exceeded")]
    CallDepthExceeded(usize),

    /// Failure reported by the OS integration layer
    #[error("host error: {0}")]
    Host(String),
}
