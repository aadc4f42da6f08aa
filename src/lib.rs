pub mod ast;
pub mod codegen;
pub mod config;
pub mod engine;
pub mod environment;
pub mod error;
pub mod hotkey;
pub mod host;
pub mod interpreter;
pub mod jit;
pub mod lexer;
pub mod ops;
pub mod parser;
pub mod printer;
pub mod stdlib;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{BinOp, Expr, Program, Statement, Token, TokenKind};
pub use codegen::{CodeGenerator, CompileError, NativeFunction};
pub use config::EngineConfig;
pub use engine::{Engine, EngineError, ExecutionMode};
pub use environment::{Environment, ModuleRegistry};
pub use error::RuntimeError;
pub use host::{Host, RecordingHost};
pub use interpreter::Interpreter;
pub use jit::{JitManager, ScriptReport};
pub use lexer::{LexError, Lexer, Position};
pub use parser::{Parser, SyntaxError};
pub use value::Value;
