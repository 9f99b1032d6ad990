use crate::commands::{CommandContext, CommandResult};

pub fn execute(ctx: &mut CommandContext<'_>) -> CommandResult {
    let Some(raw) = ctx.first_arg().map(str::to_string) else {
        return CommandResult::error("cd: missing operand");
    };
    let dir = ctx.fs.resolve(&raw);
    match ctx.fs.change_directory(&dir) {
        Ok(()) => CommandResult::empty(),
        // the message echoes the argument as typed
        Err(_) => CommandResult::error(format!("cd: no such file or directory: {}", raw)),
    }
}
