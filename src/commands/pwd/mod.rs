// src/commands/pwd/mod.rs
use crate::commands::{CommandContext, CommandResult};

pub fn execute(ctx: &mut CommandContext<'_>) -> CommandResult {
    CommandResult::success(ctx.fs.current_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::VirtualFs;

    #[test]
    fn test_pwd_root() {
        let mut fs = VirtualFs::seeded();
        assert_eq!(execute(&mut CommandContext::new(&mut fs, vec![])).stdout, "/");
    }

    #[test]
    fn test_pwd_ignores_args() {
        let mut fs = VirtualFs::seeded();
        fs.create_directory("/work").unwrap();
        fs.change_directory("/work").unwrap();
        let result = execute(&mut CommandContext::new(&mut fs, vec!["-P".to_string()]));
        assert_eq!(result.stdout, "/work");
    }
}
