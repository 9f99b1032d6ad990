// src/commands/rm/mod.rs
use crate::commands::{CommandContext, CommandResult};
use crate::fs::EntryKind;

pub fn execute(ctx: &mut CommandContext<'_>) -> CommandResult {
    let recursive = ctx.args.iter().any(|a| a == "-r");
    let force = ctx.args.iter().any(|a| a == "-f");
    let Some(raw) = ctx.args.iter().find(|a| !a.starts_with('-')).cloned() else {
        return CommandResult::error("rm: missing operand");
    };

    let target = ctx.fs.resolve(&raw);
    let removed = match ctx.fs.kind(&target) {
        None if force => Ok(()),
        None => return CommandResult::error(format!("rm: cannot remove '{}': No such file or directory", raw)),
        Some(EntryKind::File) => ctx.fs.remove_file(&target, force),
        Some(EntryKind::Directory) if !recursive => return CommandResult::error("rm: cannot remove directory"),
        Some(EntryKind::Directory) => ctx.fs.remove_directory_recursive(&target, force),
    };

    match removed {
        Ok(()) => CommandResult::empty(),
        Err(err) => CommandResult::error(format!("rm: cannot remove '{}': {}", raw, err.reason())),
    }
}
