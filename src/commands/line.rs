// src/commands/line.rs
//! Input line parsing
//!
//! A line is a `;`-separated list of sub-commands. Each sub-command may
//! carry one `>` redirect; the command part is split on whitespace.

/// One parsed sub-command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
    pub redirect: Option<String>,
}

/// Split a line on `;`, trimming each part and dropping empty ones.
pub fn split_commands(line: &str) -> Vec<&str> {
    line.split(';').map(str::trim).filter(|part| !part.is_empty()).collect()
}

/// Parse a single sub-command. Text after a second `>` is ignored.
pub fn parse_command(input: &str) -> ParsedCommand {
    let (command_part, redirect) = match input.split_once('>') {
        Some((command, rest)) => {
            let target = rest.split('>').next().unwrap_or_default().trim();
            (command, (!target.is_empty()).then(|| target.to_string()))
        }
        None => (input, None),
    };

    let mut words = command_part.split_whitespace().map(str::to_string);
    let name = words.next().unwrap_or_default();
    ParsedCommand { name, args: words.collect(), redirect }
}
