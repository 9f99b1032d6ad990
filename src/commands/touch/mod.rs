// src/commands/touch/mod.rs
use crate::commands::{CommandContext, CommandResult};

/// Create an empty file; an existing entry keeps its content.
pub fn execute(ctx: &mut CommandContext<'_>) -> CommandResult {
    let Some(raw) = ctx.first_arg() else {
        return CommandResult::error("touch: missing operand");
    };
    let file = ctx.fs.resolve(raw);
    match ctx.fs.touch(&file) {
        Ok(()) => CommandResult::empty(),
        Err(_) => CommandResult::error(format!("touch: cannot touch '{}': No such file or directory", file)),
    }
}
