//! Command execution action.

use async_trait::async_trait;
use tracing::debug;

use super::{Action, wildcard_match};
use crate::config::CommandExecutor;
use crate::render::RenderContext;

/// Runs a command as the console, or as every allowed player whose name
/// matches the configured filter. Command text passes through the
/// placeholder engine before dispatch.
pub struct CommandAction {
    executor: CommandExecutor,
    command: String,
    filter: Option<String>,
}

impl CommandAction {
    /// Creates a command action. A `*` filter means "all players".
    pub fn new(executor: CommandExecutor, command: &str, match_players: &str) -> Self {
        let filter = match executor {
            CommandExecutor::Player if match_players != "*" => Some(match_players.to_string()),
            _ => None,
        };
        Self {
            executor,
            command: command.to_string(),
            filter,
        }
    }

    fn matches(&self, name: &str) -> bool {
        self.filter
            .as_deref()
            .is_none_or(|pattern| wildcard_match(pattern, name))
    }
}

#[async_trait]
impl Action for CommandAction {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn execute(&self, rc: &RenderContext) {
        match self.executor {
            CommandExecutor::Console => {
                let cmd = rc.render(&self.command).trim().to_string();
                if cmd.is_empty() {
                    return;
                }
                debug!(command = %cmd, "Executing console command");
                rc.host().run_console_command(trim_leading_slash(&cmd)).await;
            }
            CommandExecutor::Player => {
                for player in rc.players().await {
                    if !rc.allowed(&player) || !self.matches(&player.name) {
                        continue;
                    }
                    let cmd = rc.render_for(&player, &self.command).trim().to_string();
                    if cmd.is_empty() {
                        continue;
                    }
                    rc.host().run_player_command(&player, &cmd).await;
                }
            }
        }
    }
}

fn trim_leading_slash(cmd: &str) -> &str {
    cmd.trim_start_matches('/').trim_start()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Player;
    use crate::host::testing::{HostCall, RecordingHost};
    use crate::render::testing::render_context;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_console_command_strips_slash() {
        let host = Arc::new(RecordingHost::with_players(vec![]));
        let rc = render_context(host.clone(), "t");

        let action = CommandAction::new(CommandExecutor::Console, "/alert {id}", "*");
        action.execute(&rc).await;

        assert_eq!(
            host.calls(),
            vec![HostCall::ConsoleCommand {
                command: "alert t".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_player_command_respects_filter() {
        let host = Arc::new(RecordingHost::with_players(vec![
            Player::new("AdminAri"),
            Player::new("guest"),
        ]));
        let rc = render_context(host.clone(), "t");

        let action = CommandAction::new(CommandExecutor::Player, "spawn", "Admin*");
        action.execute(&rc).await;

        assert_eq!(
            host.calls(),
            vec![HostCall::PlayerCommand {
                player: "AdminAri".to_string(),
                command: "spawn".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_blank_command_is_skipped() {
        let host = Arc::new(RecordingHost::with_players(vec![]));
        let rc = render_context(host.clone(), "t");

        let action = CommandAction::new(CommandExecutor::Console, "   ", "*");
        action.execute(&rc).await;

        assert!(host.calls().is_empty());
    }
}
