// src/commands/mod.rs
pub mod builtin;
pub mod cat;
pub mod cd_cmd;
pub mod clear_cmd;
pub mod curl;
pub mod exec_cmd;
pub mod interpreter;
pub mod line;
pub mod ls;
pub mod man_cmd;
pub mod mkdir;
pub mod pwd;
pub mod rm;
pub mod touch;
pub mod types;

pub use builtin::Builtin;
pub use interpreter::{CommandInterpreter, Executed, Invocation};
pub use types::{CommandContext, CommandResult, SessionAction};
