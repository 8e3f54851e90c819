//! Boss bar showcase.

use async_trait::async_trait;

use super::{ProgressSupplier, Showcase, TextSupplier};
use crate::host::{BossbarColor, Player};
use crate::render::RenderContext;

/// Shows the timer text on a keyed boss bar with countdown progress.
///
/// The key is the timer id; the host reuses the same bar across updates.
/// Players failing the limitation get the bar hidden instead.
pub struct BossbarShowcase {
    key: String,
    text: TextSupplier,
    progress: ProgressSupplier,
    color: BossbarColor,
}

impl BossbarShowcase {
    pub fn new(
        timer_id: &str,
        text: TextSupplier,
        progress: ProgressSupplier,
        color: BossbarColor,
    ) -> Self {
        Self {
            key: timer_id.to_string(),
            text,
            progress,
            color,
        }
    }

    fn current_progress(&self) -> f32 {
        (self.progress)().clamp(0.0, 1.0)
    }

    /// Shows (or refreshes) the bar for a single player.
    pub async fn show_to(&self, player: &Player, rc: &RenderContext) {
        if !rc.allowed(player) {
            return;
        }
        let raw = (self.text)();
        let text = rc.render_for(player, &raw);
        rc.host()
            .show_bossbar(player, &self.key, &text, self.current_progress(), self.color)
            .await;
    }

    /// Hides the bar from a single player.
    pub async fn hide_from(&self, player: &Player, rc: &RenderContext) {
        rc.host().hide_bossbar(player, &self.key).await;
    }
}

#[async_trait]
impl Showcase for BossbarShowcase {
    fn name(&self) -> &'static str {
        "bossbar"
    }

    async fn show(&self, rc: &RenderContext) {
        let raw = (self.text)();
        let progress = self.current_progress();

        for player in rc.players().await {
            if !rc.allowed(&player) {
                rc.host().hide_bossbar(&player, &self.key).await;
                continue;
            }
            let text = rc.render_for(&player, &raw);
            rc.host()
                .show_bossbar(&player, &self.key, &text, progress, self.color)
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::{HostCall, RecordingHost};
    use crate::render::testing::render_context;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_progress_is_clamped() {
        let host = Arc::new(RecordingHost::with_players(vec![Player::new("Ari")]));
        let rc = render_context(host.clone(), "t");

        let showcase = BossbarShowcase::new(
            "t",
            Arc::new(|| "x".to_string()),
            Arc::new(|| 3.5),
            BossbarColor::Red,
        );
        showcase.show(&rc).await;

        match &host.calls()[0] {
            HostCall::Bossbar { progress, key, .. } => {
                assert_eq!(*progress, 1.0);
                assert_eq!(key, "t");
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }
}
