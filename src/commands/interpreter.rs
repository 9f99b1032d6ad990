// src/commands/interpreter.rs
//! Command Interpreter
//!
//! Classifies each sub-command of a line and runs it against the virtual
//! filesystem. Failures never stop later sub-commands.

use log::debug;

use crate::fs::VirtualFs;
use crate::sandbox::SandboxRunner;

use super::builtin::Builtin;
use super::exec_cmd;
use super::line::{parse_command, split_commands, ParsedCommand};
use super::types::{CommandContext, CommandResult};

/// What the first token of a sub-command names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Builtin(Builtin),
    /// `./<file>`: run a script from the virtual filesystem.
    RunScript(String),
    /// A bare `./`.
    PermissionDenied,
    Unknown(String),
}

impl Invocation {
    pub fn classify(name: &str) -> Self {
        if let Some(builtin) = Builtin::from_name(name) {
            return Invocation::Builtin(builtin);
        }
        match name {
            "./" => Invocation::PermissionDenied,
            _ if name.starts_with("./") => Invocation::RunScript(name.to_string()),
            _ => Invocation::Unknown(name.to_string()),
        }
    }
}

/// Output of one sub-command, paired with the text it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    pub input: String,
    pub result: CommandResult,
}

#[derive(Debug, Clone, Default)]
pub struct CommandInterpreter {
    runner: SandboxRunner,
}

impl CommandInterpreter {
    pub fn new(runner: SandboxRunner) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &SandboxRunner {
        &self.runner
    }

    /// Run every sub-command of `line` in order.
    pub fn execute_line(&self, line: &str, fs: &mut VirtualFs) -> Vec<Executed> {
        split_commands(line)
            .into_iter()
            .map(|input| Executed { input: input.to_string(), result: self.execute(input, fs) })
            .collect()
    }

    /// Run a single sub-command.
    pub fn execute(&self, input: &str, fs: &mut VirtualFs) -> CommandResult {
        let ParsedCommand { name, args, redirect } = parse_command(input);
        let invocation = Invocation::classify(&name);
        debug!("dispatch {:?} args={:?} redirect={:?}", invocation, args, redirect);

        let mut ctx = CommandContext::new(fs, args);
        ctx.redirect = redirect;

        match invocation {
            Invocation::Builtin(builtin) => builtin.run(&mut ctx),
            Invocation::RunScript(token) => exec_cmd::execute(&token, &mut ctx, &self.runner),
            Invocation::PermissionDenied => CommandResult::error("zsh: permission denied: ./"),
            Invocation::Unknown(name) => CommandResult::error(format!("Command not found: {}", name)),
        }
    }
}
