//! Player transfer action.

use async_trait::async_trait;
use tracing::warn;

use super::{Action, wildcard_match};
use crate::render::RenderContext;

/// Moves matching players to a target backend server. Failures are logged
/// and reported to the affected player, never propagated.
pub struct TransferAction {
    target: String,
    transferee: String,
}

impl TransferAction {
    /// Creates a transfer action; `transferee` is a player-name wildcard.
    pub fn new(target: &str, transferee: &str) -> Self {
        Self {
            target: target.to_string(),
            transferee: transferee.to_string(),
        }
    }
}

#[async_trait]
impl Action for TransferAction {
    fn name(&self) -> &'static str {
        "transfer"
    }

    async fn execute(&self, rc: &RenderContext) {
        if self.target.is_empty() {
            return;
        }
        if !rc.host().has_server(&self.target).await {
            warn!(server = %self.target, "Transfer target server is not registered");
            return;
        }

        for player in rc.players().await {
            if !rc.allowed(&player) || !wildcard_match(&self.transferee, &player.name) {
                continue;
            }
            if let Err(e) = rc.host().transfer(&player, &self.target).await {
                warn!(player = %player.name, error = %e, "Failed to transfer player");
                let message = rc
                    .catalog()
                    .format(
                        "downcount.action.transfer.failed",
                        &[&self.target, &e.to_string()],
                    )
                    .unwrap_or_else(|| e.to_string());
                rc.host().send_message(&player, &message).await;
            }
        }
    }
}
