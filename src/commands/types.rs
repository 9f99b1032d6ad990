// src/commands/types.rs
use crate::fs::VirtualFs;

use super::curl::CurlRequest;

/// Follow-up work a command asks the session to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Wipe the display buffer.
    ClearScreen,
    /// Issue an HTTP request; its output arrives later.
    Fetch(CurlRequest),
}

/// Result of running one sub-command
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub action: Option<SessionAction>,
}

impl CommandResult {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self { stdout: stdout.into(), ..Self::default() }
    }

    pub fn error(stderr: impl Into<String>) -> Self {
        Self { stderr: stderr.into(), ..Self::default() }
    }

    /// No output at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_action(action: SessionAction) -> Self {
        Self { action: Some(action), ..Self::default() }
    }

    pub fn is_error(&self) -> bool {
        !self.stderr.is_empty()
    }

    /// Text appended to the display, if any.
    pub fn output(&self) -> Option<&str> {
        if self.is_error() {
            Some(&self.stderr)
        } else if !self.stdout.is_empty() {
            Some(&self.stdout)
        } else {
            None
        }
    }
}

/// Execution context for one sub-command
pub struct CommandContext<'a> {
    pub args: Vec<String>,
    /// Target after `>`; only `cat` honors it.
    pub redirect: Option<String>,
    pub fs: &'a mut VirtualFs,
}

impl<'a> CommandContext<'a> {
    pub fn new(fs: &'a mut VirtualFs, args: Vec<String>) -> Self {
        Self { args, redirect: None, fs }
    }

    pub fn with_redirect(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into());
        self
    }

    /// First argument, if present.
    pub fn first_arg(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}
