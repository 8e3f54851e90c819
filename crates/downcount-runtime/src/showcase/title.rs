//! Title showcase.

use async_trait::async_trait;

use super::{Showcase, TextSupplier};
use crate::host::TitleTimes;
use crate::render::RenderContext;

/// Shows the timer text as a title with a fixed subtitle line.
pub struct TitleShowcase {
    text: TextSupplier,
    subtitle: String,
}

impl TitleShowcase {
    pub fn new(text: TextSupplier, subtitle: String) -> Self {
        Self { text, subtitle }
    }
}

#[async_trait]
impl Showcase for TitleShowcase {
    fn name(&self) -> &'static str {
        "title"
    }

    async fn show(&self, rc: &RenderContext) {
        let raw = (self.text)();
        for player in rc.players().await {
            if !rc.allowed(&player) {
                continue;
            }
            let title = rc.render_for(&player, &raw);
            let subtitle = rc.render_for(&player, &self.subtitle);
            rc.host()
                .show_title(&player, &title, &subtitle, TitleTimes::default())
                .await;
        }
    }
}
