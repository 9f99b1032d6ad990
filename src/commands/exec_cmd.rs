use log::debug;

use crate::commands::{CommandContext, CommandResult};
use crate::sandbox::{SandboxRunner, VfsHost};

/// Run `./<file>` in the sandbox. Only existing `.js` files qualify.
pub fn execute(token: &str, ctx: &mut CommandContext<'_>, runner: &SandboxRunner) -> CommandResult {
    let path = ctx.fs.resolve(token);
    let code = match ctx.fs.read_file(&path) {
        Ok(code) if path.ends_with(".js") => code.to_string(),
        _ => return CommandResult::error(format!("{}: No such file or directory or not executable", token)),
    };

    debug!("exec {}", path);
    CommandResult::success(runner.run(&code, &mut VfsHost::new(&mut *ctx.fs)))
}
