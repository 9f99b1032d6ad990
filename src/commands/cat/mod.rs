// src/commands/cat/mod.rs
//! cat - print a file, or with `> target` write the remaining arguments
//! into `target` instead.

use crate::commands::{CommandContext, CommandResult};

pub const USAGE: &str = "Usage: cat <filename> [<content>]";

pub fn execute(ctx: &mut CommandContext<'_>) -> CommandResult {
    if ctx.args.is_empty() {
        return CommandResult::error(USAGE);
    }

    if let Some(target) = ctx.redirect.as_deref() {
        let path = ctx.fs.resolve(target);
        let content = ctx.args[1..].join(" ");
        return match ctx.fs.write_file(&path, content) {
            Ok(()) => CommandResult::empty(),
            Err(err) => CommandResult::error(format!("cat: {}: {}", path, err.reason())),
        };
    }

    let file = ctx.fs.resolve(&ctx.args[0]);
    match ctx.fs.read_file(&file) {
        Ok(content) => CommandResult::success(content),
        Err(_) => CommandResult::error(format!("cat: {}: No such file or directory", file)),
    }
}
