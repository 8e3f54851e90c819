//! Chat message showcase.

use async_trait::async_trait;

use super::{Showcase, TextSupplier};
use crate::render::RenderContext;

/// Shows the timer text as a chat message.
pub struct TextShowcase {
    text: TextSupplier,
}

impl TextShowcase {
    pub fn new(text: TextSupplier) -> Self {
        Self { text }
    }
}

#[async_trait]
impl Showcase for TextShowcase {
    fn name(&self) -> &'static str {
        "text"
    }

    async fn show(&self, rc: &RenderContext) {
        let raw = (self.text)();
        for player in rc.players().await {
            if !rc.allowed(&player) {
                continue;
            }
            rc.host()
                .send_message(&player, &rc.render_for(&player, &raw))
                .await;
        }
    }
}
