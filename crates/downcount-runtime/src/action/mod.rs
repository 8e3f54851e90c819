//! Actions fired around a timer's target time.

mod command;
mod text;
mod transfer;

pub use command::CommandAction;
pub use text::TextAction;
pub use transfer::TransferAction;

use std::sync::Arc;

use async_trait::async_trait;
use downcount_core::Catalog;

use crate::config::ActionConfig;
use crate::render::RenderContext;

/// A unit of behavior triggered by the timer runtime.
///
/// Implementations must not panic from [`execute`](Action::execute);
/// failures are logged and the runtime moves on.
#[async_trait]
pub trait Action: Send + Sync {
    /// Identifier of this action type, matching the config `type` tag.
    fn name(&self) -> &'static str;

    /// Localized human-readable description.
    fn description(&self, catalog: &Catalog) -> String {
        catalog
            .get(&format!("downcount.action.{}.desc", self.name()))
            .unwrap_or_default()
            .to_string()
    }

    /// Executes the action.
    async fn execute(&self, rc: &RenderContext);
}

/// Builds the action described by a config entry.
pub fn create(config: &ActionConfig) -> Arc<dyn Action> {
    match config {
        ActionConfig::Command {
            executor,
            command,
            match_players,
            ..
        } => Arc::new(CommandAction::new(*executor, command, match_players)),
        ActionConfig::Text {
            text_type, info, ..
        } => Arc::new(TextAction::from_config(*text_type, info)),
        ActionConfig::Transfer {
            target, transferee, ..
        } => Arc::new(TransferAction::new(target, transferee)),
    }
}

/// Matches `input` against a glob-style pattern where `*` matches any run
/// of characters. A bare `*` matches everything.
pub(crate) fn wildcard_match(pattern: &str, input: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let s: Vec<char> = input.chars().collect();

    let mut pi = 0;
    let mut si = 0;
    let mut star: Option<usize> = None;
    let mut mark = 0;

    while si < s.len() {
        if pi < p.len() && (p[pi] == s[si]) {
            pi += 1;
            si += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some(pi);
            mark = si;
            pi += 1;
        } else if let Some(star_pos) = star {
            pi = star_pos + 1;
            mark += 1;
            si = mark;
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}
