//! Showcases: periodic displays shown while a timer target is pending.

mod actionbar;
mod bossbar;
mod text;
mod title;

pub use actionbar::ActionbarShowcase;
pub use bossbar::BossbarShowcase;
pub use text::TextShowcase;
pub use title::TitleShowcase;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use downcount_core::Catalog;

use crate::config::ShowcaseConfig;
use crate::host::BossbarColor;
use crate::render::RenderContext;

/// Supplies the raw display text at show time (the after-window may swap
/// it out).
pub type TextSupplier = Arc<dyn Fn() -> String + Send + Sync>;

/// Supplies the boss bar progress at show time.
pub type ProgressSupplier = Arc<dyn Fn() -> f32 + Send + Sync>;

/// A display unit that presents timer information to players.
///
/// Implementations fetch dynamic content (the current timer text) at display
/// time and must not panic from [`show`](Showcase::show).
#[async_trait]
pub trait Showcase: Send + Sync {
    /// Identifier of this showcase kind, matching the config key.
    fn name(&self) -> &'static str;

    /// Localized human-readable description.
    fn description(&self, catalog: &Catalog) -> String {
        catalog
            .get(&format!("downcount.showcase.{}.desc", self.name()))
            .unwrap_or_default()
            .to_string()
    }

    /// Displays the showcase content to all allowed players.
    async fn show(&self, rc: &RenderContext);
}

/// The four showcase kinds and their default send intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowcaseKind {
    Actionbar,
    Bossbar,
    Text,
    Title,
}

impl ShowcaseKind {
    /// Parses a config key into a kind.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "actionbar" => Some(Self::Actionbar),
            "bossbar" => Some(Self::Bossbar),
            "text" => Some(Self::Text),
            "title" => Some(Self::Title),
            _ => None,
        }
    }

    /// Default interval between sends for this kind.
    pub fn default_interval(self) -> Duration {
        match self {
            Self::Text => Duration::seconds(10),
            Self::Actionbar | Self::Bossbar | Self::Title => Duration::seconds(1),
        }
    }

    /// Whether this kind may keep displaying during an after-window.
    pub fn allows_after(self) -> bool {
        matches!(self, Self::Actionbar | Self::Bossbar | Self::Title)
    }
}

/// One live showcase with its throttle state.
pub struct ShowcaseSlot {
    kind: ShowcaseKind,
    config: ShowcaseConfig,
    showcase: Arc<dyn Showcase>,
    last_sent_ms: i64,
}

impl ShowcaseSlot {
    /// Creates a slot that has never sent.
    pub fn new(kind: ShowcaseKind, config: ShowcaseConfig, showcase: Arc<dyn Showcase>) -> Self {
        Self {
            kind,
            config,
            showcase,
            last_sent_ms: 0,
        }
    }

    /// The showcase kind.
    pub fn kind(&self) -> ShowcaseKind {
        self.kind
    }

    /// The showcase configuration.
    pub fn config(&self) -> &ShowcaseConfig {
        &self.config
    }

    /// The showcase itself.
    pub fn showcase(&self) -> &Arc<dyn Showcase> {
        &self.showcase
    }

    /// Effective send interval in milliseconds.
    pub fn interval_ms(&self) -> i64 {
        self.config
            .interval_duration()
            .unwrap_or_else(|| self.kind.default_interval())
            .num_milliseconds()
    }

    /// Claims a send slot: returns `true` at most once per interval.
    pub fn try_acquire(&mut self, now_ms: i64, interval_ms: i64) -> bool {
        if interval_ms <= 0 {
            return true;
        }
        if now_ms - self.last_sent_ms < interval_ms {
            return false;
        }
        self.last_sent_ms = now_ms;
        true
    }
}

/// Builds the showcase for a kind.
///
/// Returns the trait object plus, for boss bars, the concrete showcase so
/// the caller can drive per-player refresh and teardown.
pub fn create(
    kind: ShowcaseKind,
    timer_id: &str,
    config: &ShowcaseConfig,
    text: TextSupplier,
    progress: ProgressSupplier,
) -> (Arc<dyn Showcase>, Option<Arc<BossbarShowcase>>) {
    match kind {
        ShowcaseKind::Text => (Arc::new(TextShowcase::new(text)), None),
        ShowcaseKind::Actionbar => (Arc::new(ActionbarShowcase::new(text)), None),
        ShowcaseKind::Title => (
            Arc::new(TitleShowcase::new(text, config.subtitle.clone())),
            None,
        ),
        ShowcaseKind::Bossbar => {
            let color = config
                .color
                .as_deref()
                .map(BossbarColor::parse)
                .unwrap_or_default();
            let bossbar = Arc::new(BossbarShowcase::new(timer_id, text, progress, color));
            (bossbar.clone(), Some(bossbar))
        }
    }
}
