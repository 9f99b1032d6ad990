//! shellbox - an in-memory Unix-like shell
//!
//! A virtual filesystem, a small command interpreter (`ls`, `cat`, `cd`,
//! `mkdir`, `rm`, `touch`, `pwd`, `man`, `curl`, `clear`) and a sandbox
//! that runs `.js` files from the virtual tree against shimmed
//! `console`, `process` and `fs` globals. Nothing touches the real disk.

pub mod commands;
pub mod config;
pub mod display;
pub mod fs;
pub mod history;
pub mod network;
pub mod output;
pub mod sandbox;
pub mod session;

pub use commands::{CommandInterpreter, CommandResult};
pub use config::SessionOptions;
pub use fs::VirtualFs;
pub use sandbox::SandboxRunner;
pub use session::Session;
