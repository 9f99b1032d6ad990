use crate::commands::{CommandContext, CommandResult, SessionAction};

/// Ask the session to wipe its display buffer.
pub fn execute(_ctx: &mut CommandContext<'_>) -> CommandResult {
    CommandResult::with_action(SessionAction::ClearScreen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::VirtualFs;

    #[test]
    fn test_clear_requests_screen_clear() {
        let mut fs = VirtualFs::seeded();
        let result = execute(&mut CommandContext::new(&mut fs, vec!["ignored".to_string()]));
        assert_eq!(result.action, Some(SessionAction::ClearScreen));
        assert_eq!(result.output(), None);
    }
}
