//! Evaluation context supplied to placeholder resolvers.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};

/// Snapshot of the state a single resolution call is evaluated against.
///
/// Built by the caller for one render pass and borrowed by resolvers for the
/// duration of that pass; the core never stores or mutates it.
#[derive(Debug, Clone)]
pub struct EvalContext {
    id: String,
    description: String,
    now: DateTime<Utc>,
    target: Option<DateTime<FixedOffset>>,
    target_text: String,
    remaining_secs: i64,
    vars: HashMap<String, String>,
}

impl EvalContext {
    /// Creates a context with no pending target and no variables.
    pub fn new(id: impl Into<String>, description: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            now,
            target: None,
            target_text: String::new(),
            remaining_secs: 0,
            vars: HashMap::new(),
        }
    }

    /// Sets the pending target time and its preformatted display text.
    ///
    /// Remaining seconds are derived from `now`, clamped at zero.
    pub fn with_target(mut self, target: DateTime<FixedOffset>, target_text: impl Into<String>) -> Self {
        self.remaining_secs = (target.with_timezone(&Utc) - self.now).num_seconds().max(0);
        self.target = Some(target);
        self.target_text = target_text.into();
        self
    }

    /// Adds an externally supplied variable (e.g. `player` → a username).
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Adds a batch of externally supplied variables.
    pub fn with_vars<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.vars.extend(vars);
        self
    }

    /// Timer id this context describes.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Raw configured description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The instant the render pass observes.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Pending target, if the timer has one.
    pub fn target(&self) -> Option<DateTime<FixedOffset>> {
        self.target
    }

    /// Preformatted target display text, empty when no target is pending.
    pub fn target_text(&self) -> &str {
        &self.target_text
    }

    /// Seconds until the target, never negative.
    pub fn remaining_secs(&self) -> i64 {
        self.remaining_secs
    }

    /// Looks up an externally supplied variable.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Whole days of the remaining time.
    pub fn days(&self) -> i64 {
        self.remaining_secs / 86_400
    }

    /// Hour component after days are taken out.
    pub fn hours_part(&self) -> i64 {
        (self.remaining_secs % 86_400) / 3_600
    }

    /// Minute component after hours are taken out.
    pub fn minutes_part(&self) -> i64 {
        (self.remaining_secs % 3_600) / 60
    }

    /// Second component after minutes are taken out.
    pub fn seconds_part(&self) -> i64 {
        self.remaining_secs % 60
    }

    /// Remaining time expressed as whole hours.
    pub fn total_hours(&self) -> i64 {
        self.remaining_secs / 3_600
    }

    /// Remaining time expressed as whole minutes.
    pub fn total_minutes(&self) -> i64 {
        self.remaining_secs / 60
    }
}
