//! Script Sandbox
//!
//! Runs user scripts written in a JavaScript subset against a restricted
//! set of globals. Filesystem and process access go through a `ScriptHost`.

pub mod builtins;
pub mod console;
pub mod error;
pub mod host;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod runner;
pub mod types;
pub mod value;

pub use error::ScriptError;
pub use host::{ScriptHost, VfsHost};
pub use runner::{SandboxLimits, SandboxRunner};
