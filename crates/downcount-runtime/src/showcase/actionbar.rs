//! Action bar showcase.

use async_trait::async_trait;

use super::{Showcase, TextSupplier};
use crate::render::RenderContext;

/// Shows the timer text on the action bar.
pub struct ActionbarShowcase {
    text: TextSupplier,
}

impl ActionbarShowcase {
    pub fn new(text: TextSupplier) -> Self {
        Self { text }
    }
}

#[async_trait]
impl Showcase for ActionbarShowcase {
    fn name(&self) -> &'static str {
        "actionbar"
    }

    async fn show(&self, rc: &RenderContext) {
        let raw = (self.text)();
        for player in rc.players().await {
            if !rc.allowed(&player) {
                continue;
            }
            rc.host()
                .send_actionbar(&player, &rc.render_for(&player, &raw))
                .await;
        }
    }
}
