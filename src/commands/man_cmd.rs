use crate::commands::builtin::Builtin;
use crate::commands::{CommandContext, CommandResult};

pub fn execute(ctx: &mut CommandContext<'_>) -> CommandResult {
    let Some(name) = ctx.first_arg() else {
        return CommandResult::error("man: missing operand");
    };
    match Builtin::from_name(name) {
        Some(builtin) => CommandResult::success(builtin.manual()),
        None => CommandResult::error(format!("No manual entry for {}", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::VirtualFs;

    fn run(args: &[&str]) -> CommandResult {
        let mut fs = VirtualFs::seeded();
        execute(&mut CommandContext::new(&mut fs, args.iter().map(|s| s.to_string()).collect()))
    }

    #[test]
    fn test_man_known_command() {
        assert_eq!(run(&["pwd"]).stdout, "Usage: pwd\nPrint the current working directory");
        assert!(run(&["curl"]).stdout.contains("-X <method>  Specify request method (GET, POST, etc.)"));
    }

    #[test]
    fn test_man_unknown_command() {
        assert_eq!(run(&["vim"]).stderr, "No manual entry for vim");
        assert_eq!(run(&["./script.js"]).stderr, "No manual entry for ./script.js");
    }

    #[test]
    fn test_man_missing_operand() {
        assert_eq!(run(&[]).stderr, "man: missing operand");
    }
}
