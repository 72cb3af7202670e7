use log::debug;

use crate::commands::{CommandResult, markdown_response::format_help};

/// Handles the help command, available to every guild member.
///
/// # Returns
///
/// The command summary as a single reply.
pub fn handle_help() -> CommandResult {
    debug!("handling help command");
    CommandResult::reply(format_help())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_help() {
        let result = handle_help();
        assert_eq!(result.replies.len(), 1);
        assert!(result.replies[0].contains("**commands:**"));
    }
}
