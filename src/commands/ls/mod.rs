// src/commands/ls/mod.rs
use crate::commands::{CommandContext, CommandResult};

/// List the entries of a directory, space-joined in creation order.
pub fn execute(ctx: &mut CommandContext<'_>) -> CommandResult {
    let dir = ctx.fs.resolve(ctx.first_arg().unwrap_or(""));
    match ctx.fs.list_directory(&dir) {
        Ok(names) => CommandResult::success(names.join(" ")),
        Err(_) => CommandResult::error(format!("ls: cannot access '{}': No such file or directory", dir)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::VirtualFs;

    fn run(fs: &mut VirtualFs, args: &[&str]) -> CommandResult {
        let mut ctx = CommandContext::new(fs, args.iter().map(|s| s.to_string()).collect());
        execute(&mut ctx)
    }

    #[test]
    fn test_ls_current_directory() {
        let mut fs = VirtualFs::seeded();
        assert_eq!(run(&mut fs, &[]).stdout, "hello_world.txt script.js");
    }

    #[test]
    fn test_ls_relative_to_cwd() {
        let mut fs = VirtualFs::seeded();
        fs.create_directory("/a").unwrap();
        fs.create_directory("/a/b").unwrap();
        fs.touch("/a/b/c.txt").unwrap();
        fs.change_directory("/a").unwrap();
        assert_eq!(run(&mut fs, &["b"]).stdout, "c.txt");
        assert_eq!(run(&mut fs, &[]).stdout, "b");
        assert_eq!(run(&mut fs, &[".."]).stdout, "hello_world.txt script.js a");
    }

    #[test]
    fn test_ls_empty_directory() {
        let mut fs = VirtualFs::seeded();
        fs.create_directory("/empty").unwrap();
        let result = run(&mut fs, &["/empty"]);
        assert!(!result.is_error());
        assert_eq!(result.output(), None);
    }

    #[test]
    fn test_ls_missing_uses_normalized_path() {
        let mut fs = VirtualFs::seeded();
        let result = run(&mut fs, &["nope/../missing"]);
        assert_eq!(result.stderr, "ls: cannot access '/missing': No such file or directory");
    }

    #[test]
    fn test_ls_on_file() {
        let mut fs = VirtualFs::seeded();
        let result = run(&mut fs, &["/script.js"]);
        assert_eq!(result.stderr, "ls: cannot access '/script.js': No such file or directory");
    }
}
