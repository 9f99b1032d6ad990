// src/commands/mkdir/mod.rs
use crate::commands::{CommandContext, CommandResult};
use crate::fs::FsError;

pub fn execute(ctx: &mut CommandContext<'_>) -> CommandResult {
    let Some(raw) = ctx.first_arg() else {
        return CommandResult::error("mkdir: missing operand");
    };
    let dir = ctx.fs.resolve(raw);
    match ctx.fs.create_directory(&dir) {
        Ok(()) => CommandResult::empty(),
        Err(FsError::AlreadyExists { .. }) => {
            CommandResult::error(format!("mkdir: cannot create directory ‘{}’: File exists", dir))
        }
        Err(_) => CommandResult::error(format!("mkdir: cannot create directory ‘{}’: No such file or directory", dir)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::VirtualFs;

    fn run(fs: &mut VirtualFs, args: &[&str]) -> CommandResult {
        execute(&mut CommandContext::new(fs, args.iter().map(|s| s.to_string()).collect()))
    }

    #[test]
    fn test_mkdir_creates_directory() {
        let mut fs = VirtualFs::seeded();
        assert_eq!(run(&mut fs, &["docs"]), CommandResult::empty());
        assert!(fs.is_dir("/docs"));
        assert_eq!(fs.list_directory("/").unwrap().last().map(String::as_str), Some("docs"));
    }

    #[test]
    fn test_mkdir_missing_operand() {
        let mut fs = VirtualFs::seeded();
        assert_eq!(run(&mut fs, &[]).stderr, "mkdir: missing operand");
    }

    #[test]
    fn test_mkdir_existing_path() {
        let mut fs = VirtualFs::seeded();
        assert_eq!(
            run(&mut fs, &["./hello_world.txt"]).stderr,
            "mkdir: cannot create directory ‘/hello_world.txt’: File exists"
        );
        assert!(fs.is_file("/hello_world.txt"));
    }

    #[test]
    fn test_mkdir_missing_parent() {
        let mut fs = VirtualFs::seeded();
        assert_eq!(
            run(&mut fs, &["a/b"]).stderr,
            "mkdir: cannot create directory ‘/a/b’: No such file or directory"
        );
        assert!(!fs.exists("/a/b"));
    }

    #[test]
    fn test_mkdir_then_cd() {
        let mut fs = VirtualFs::seeded();
        run(&mut fs, &["x/../nested"]);
        fs.change_directory("/nested").unwrap();
        assert_eq!(fs.current_dir(), "/nested");
    }
}
