//! Immutable settings snapshot consumed by the placeholder engine.
//!
//! A [`Settings`] value is produced once per configuration load and never
//! mutated afterwards. Reloads build a fresh snapshot and swap it in
//! wholesale, so every registry built from a `Settings` observes one
//! consistent view of the configuration.

use std::collections::BTreeMap;

use crate::animation::Animation;

/// What `resolve` returns when a placeholder name has no definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissPolicy {
    /// Return the original token unchanged (visible failure).
    #[default]
    Token,
    /// Return an empty string.
    Blank,
}

/// Immutable snapshot of the parsed configuration relevant to resolution.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    templates: BTreeMap<String, String>,
    flags: BTreeMap<String, bool>,
    animations: BTreeMap<String, Animation>,
    miss: MissPolicy,
}

impl Settings {
    /// Creates a snapshot from its parts.
    pub fn new(
        templates: BTreeMap<String, String>,
        flags: BTreeMap<String, bool>,
        animations: BTreeMap<String, Animation>,
        miss: MissPolicy,
    ) -> Self {
        Self {
            templates,
            flags,
            animations,
            miss,
        }
    }

    /// Template bodies keyed by placeholder name.
    pub fn templates(&self) -> &BTreeMap<String, String> {
        &self.templates
    }

    /// Returns the value of a feature flag, `false` when absent.
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// All configured feature flags.
    pub fn flags(&self) -> &BTreeMap<String, bool> {
        &self.flags
    }

    /// Looks up a configured animation by id.
    pub fn animation(&self, id: &str) -> Option<&Animation> {
        self.animations.get(id)
    }

    /// Miss policy for unresolvable placeholder names.
    pub fn miss_policy(&self) -> MissPolicy {
        self.miss
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_defaults_to_false() {
        let settings = Settings::default();
        assert!(!settings.flag("anything"));
    }

    #[test]
    fn test_flag_lookup() {
        let mut flags = BTreeMap::new();
        flags.insert("broadcast".to_string(), true);
        let settings = Settings::new(BTreeMap::new(), flags, BTreeMap::new(), MissPolicy::Token);
        assert!(settings.flag("broadcast"));
        assert!(!settings.flag("other"));
    }
}
