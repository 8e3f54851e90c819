//! Text display action.

use std::time::Duration;

use async_trait::async_trait;

use super::Action;
use crate::config::TextKind;
use crate::host::TitleTimes;
use crate::render::RenderContext;

/// Displays text to every allowed player: chat message, action bar line, or
/// title/subtitle with optional timing.
pub struct TextAction {
    kind: TextKind,
    text: String,
    subtitle: String,
    times: TitleTimes,
}

impl TextAction {
    /// Builds a text action from the raw `info` config value.
    ///
    /// For titles `info` may be a `[title, subtitle, fade-in, stay,
    /// fade-out]` sequence; everywhere else a scalar is taken as the text.
    pub fn from_config(kind: TextKind, info: &serde_yaml::Value) -> Self {
        let mut text = String::new();
        let mut subtitle = String::new();
        let mut times = TitleTimes::default();

        match info {
            serde_yaml::Value::Sequence(items)
                if matches!(kind, TextKind::Title | TextKind::Subtitle) =>
            {
                text = items.first().map(value_to_string).unwrap_or_default();
                subtitle = items.get(1).map(value_to_string).unwrap_or_default();
                if let Some(secs) = items.get(2).and_then(value_to_seconds) {
                    times.fade_in = secs;
                }
                if let Some(secs) = items.get(3).and_then(value_to_seconds) {
                    times.stay = secs;
                }
                if let Some(secs) = items.get(4).and_then(value_to_seconds) {
                    times.fade_out = secs;
                }
            }
            other => {
                let scalar = value_to_string(other);
                if kind == TextKind::Subtitle {
                    subtitle = scalar;
                } else {
                    text = scalar;
                }
            }
        }

        Self {
            kind,
            text,
            subtitle,
            times,
        }
    }
}

#[async_trait]
impl Action for TextAction {
    fn name(&self) -> &'static str {
        "text"
    }

    async fn execute(&self, rc: &RenderContext) {
        for player in rc.players().await {
            if !rc.allowed(&player) {
                continue;
            }
            match self.kind {
                TextKind::Message => {
                    rc.host()
                        .send_message(&player, &rc.render_for(&player, &self.text))
                        .await;
                }
                TextKind::Actionbar => {
                    rc.host()
                        .send_actionbar(&player, &rc.render_for(&player, &self.text))
                        .await;
                }
                TextKind::Title | TextKind::Subtitle => {
                    let title = rc.render_for(&player, &self.text);
                    let subtitle = rc.render_for(&player, &self.subtitle);
                    rc.host()
                        .show_title(&player, &title, &subtitle, self.times)
                        .await;
                }
            }
        }
    }
}

fn value_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn value_to_seconds(value: &serde_yaml::Value) -> Option<Duration> {
    let secs = match value {
        serde_yaml::Value::Number(n) => n.as_i64()?,
        serde_yaml::Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    Some(Duration::from_secs(secs.max(0) as u64))
}
