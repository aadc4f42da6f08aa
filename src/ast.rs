//! # Hotkey Language - Abstract Syntax Tree
//!
//! This module defines the tokens and the Abstract Syntax Tree (AST) of the
//! hotkey automation language: scripts that bind key combinations to actions
//! built from pipelines of built-in operations.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (literals, calls, members, pipelines)
//! - **[operators]** - Binary operators (comparison, arithmetic, logical)
//! - **[statements]** - Statements (bindings, blocks, `let`, `if`, `while`, `fn`)
//! - **[program]** - A complete parsed script
//! - **[visitor]** - Double-dispatch traversal, one callback per node kind
//!
//! ## Quick Start
//!
//! ```text
//! F2 => { clipboard.out | text.upper | text.replace " " "_" | send }
//! ```
//!
//! Pressing F2 reads the clipboard, upper-cases it, replaces spaces with
//! underscores and types the result.
//!
//! ## Core Concepts
//!
//! ### Pipelines
//!
//! Stages are chained with `|`. Every stage after the first receives the
//! previous result as its first argument:
//!
//! ```text
//! "hello world" | text.upper | text.replace " " "_"   // "HELLO_WORLD"
//! ```
//!
//! ### Hotkey Literals
//!
//! Key combinations are single tokens. Word modifiers (`Ctrl+`, `Alt+`,
//! `Shift+`, `Win+`) and symbolic prefixes (`^` Ctrl, `!` Alt, `+` Shift,
//! `#` Win) are both accepted:
//!
//! ```text
//! Ctrl+V => send clipboard.out
//! #1 => window.focus("Editor")
//! ```
//!
//! ### Command Calls
//!
//! A function name followed by arguments on the same line is a call, so
//! `send "x"` is `send("x")` and `text.replace " " "_"` passes two arguments.
//!
//! ### Values
//!
//! Null, booleans, integers, floats, strings and string lists, with total
//! conversions between them (see [`crate::value`]).
pub mod expressions;
pub mod operators;
pub mod program;
pub mod statements;
pub mod tokens;
pub mod visitor;

pub use expressions::Expr;
pub use operators::BinOp;
pub use program::Program;
pub use statements::{FunctionDecl, Statement};
pub use tokens::{Token, TokenKind};
pub use visitor::Visitor;
