//! Message catalog for the `{i18n:<key>}` placeholder and runtime messages.
//!
//! Patterns use `{0}`-style positional arguments. A built-in `en_us` catalog
//! ships with the crate; the runtime layers configured language files on top.

use std::collections::HashMap;

/// A flat key-to-pattern message catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    messages: HashMap<String, String>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog from a message map.
    pub fn from_messages(messages: HashMap<String, String>) -> Self {
        Self { messages }
    }

    /// The built-in English catalog, used as the final fallback.
    pub fn builtin_en_us() -> Self {
        let entries: &[(&str, &str)] = &[
            ("downcount.prefix", "[downcount] "),
            ("downcount.command.usage", "Usage: {0}"),
            ("downcount.command.no_perms", "You do not have permission to do that."),
            ("downcount.command.reload", "Configuration reloaded."),
            ("downcount.command.reload_failed", "Reload failed: {0}"),
            ("downcount.command.list.header", "Active timers:"),
            ("downcount.command.list.empty", "No timers configured."),
            ("downcount.action.command.desc", "Execute a command"),
            ("downcount.action.text.desc", "Display a text"),
            ("downcount.action.transfer.desc", "Transfer players to a server"),
            ("downcount.action.transfer.failed", "Could not move you to {0}: {1}"),
            ("downcount.showcase.text.desc", "Chat message display"),
            ("downcount.showcase.actionbar.desc", "Action bar display"),
            ("downcount.showcase.title.desc", "Title display"),
            ("downcount.showcase.bossbar.desc", "Boss bar display"),
        ];
        let messages = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { messages }
    }

    /// Overlays `other` on top of this catalog, keeping existing keys as
    /// fallback.
    pub fn merged_with(mut self, other: Catalog) -> Self {
        self.messages.extend(other.messages);
        self
    }

    /// Raw pattern for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    /// Number of patterns in the catalog.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` when the catalog has no patterns.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Formats a pattern with positional arguments.
    ///
    /// `{0}` is replaced with `args[0]` and so on; placeholders without a
    /// matching argument stay verbatim. Returns `None` for unknown keys.
    pub fn format(&self, key: &str, args: &[&str]) -> Option<String> {
        let pattern = self.get(key)?;
        if args.is_empty() {
            return Some(pattern.to_string());
        }
        let mut out = pattern.to_string();
        for (i, arg) in args.iter().enumerate() {
            out = out.replace(&format!("{{{i}}}"), arg);
        }
        Some(out)
    }
}
