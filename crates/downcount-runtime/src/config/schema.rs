//! Configuration schema definitions.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{Duration, FixedOffset};
use downcount_core::{Animation, Frame, MissPolicy, Settings, parse_duration_loose};
use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};

/// `chrono` format string for one-shot timer targets.
pub const ONE_SHOT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Root configuration structure.
///
/// Unknown keys are ignored for forward compatibility; missing keys fall
/// back to the documented defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DowncountConfig {
    /// Global settings that apply to all timers.
    #[serde(default)]
    pub global: GlobalConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Placeholder templates keyed by placeholder name.
    #[serde(default)]
    pub templates: BTreeMap<String, String>,

    /// Feature flags keyed by flag name.
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,

    /// Timer definitions keyed by timer id.
    #[serde(default)]
    pub timers: BTreeMap<String, TimerConfig>,

    /// Text animations keyed by animation id.
    #[serde(default)]
    pub animations: BTreeMap<String, AnimationConfig>,
}

impl DowncountConfig {
    /// Parses a YAML document into a configuration.
    ///
    /// Syntax errors surface as [`ConfigError::MalformedDocument`] with the
    /// parser's line/column; structurally valid YAML whose values have the
    /// wrong type surfaces as [`ConfigError::InvalidValueType`]. An empty
    /// document yields the defaults.
    pub fn from_yaml_str(source: &str) -> ConfigResult<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(source)?;
        match value {
            serde_yaml::Value::Null => Ok(Self::default()),
            serde_yaml::Value::Mapping(_) => {
                Self::deserialize(value).map_err(|e| ConfigError::invalid_value(e.to_string()))
            }
            _ => Err(ConfigError::validation(
                "top-level of the configuration must be a mapping",
            )),
        }
    }

    /// Converts the configuration into a core settings snapshot.
    pub fn to_settings(&self) -> Settings {
        let animations = self
            .animations
            .iter()
            .map(|(id, cfg)| (id.clone(), cfg.to_animation()))
            .collect();
        Settings::new(
            self.templates.clone(),
            self.flags.clone(),
            animations,
            self.global.miss.to_policy(),
        )
    }
}

/// Global configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Language for the message catalog.
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Fixed UTC offset all schedules are evaluated in, e.g. `"+08:00"`.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// What `resolve` returns for unknown placeholder names.
    #[serde(default)]
    pub miss: MissMode,

    /// Global server limitation applied to every timer.
    #[serde(default)]
    pub limitation: LimitationConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            lang: default_lang(),
            timezone: default_timezone(),
            miss: MissMode::default(),
            limitation: LimitationConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Parses the configured timezone into a fixed offset.
    pub fn zone(&self) -> ConfigResult<FixedOffset> {
        parse_utc_offset(&self.timezone).ok_or_else(|| {
            ConfigError::validation(format!(
                "invalid timezone '{}': expected a UTC offset like '+08:00'",
                self.timezone
            ))
        })
    }
}

fn default_lang() -> String {
    "en_us".to_string()
}

fn default_timezone() -> String {
    "+00:00".to_string()
}

/// Parses `Z`, `UTC`, `±HH:MM` or `±HHMM` into a [`FixedOffset`].
pub(crate) fn parse_utc_offset(s: &str) -> Option<FixedOffset> {
    let t = s.trim();
    if t.eq_ignore_ascii_case("z") || t.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (negative, rest) = match t.as_bytes().first()? {
        b'+' => (false, &t[1..]),
        b'-' => (true, &t[1..]),
        _ => return None,
    };

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        _ => return None,
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    let seconds = hours * 3_600 + minutes * 60;
    if negative {
        FixedOffset::west_opt(seconds)
    } else {
        FixedOffset::east_opt(seconds)
    }
}

/// Miss behavior for unknown placeholder names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissMode {
    /// Return the unresolved token (visible failure).
    #[default]
    Token,
    /// Return an empty string.
    Blank,
}

impl MissMode {
    /// Converts to the core miss policy.
    pub fn to_policy(self) -> MissPolicy {
        match self {
            Self::Token => MissPolicy::Token,
            Self::Blank => MissPolicy::Blank,
        }
    }
}

/// Whitelist/blacklist of backend server names.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LimitationConfig {
    /// Whether the list is a blacklist (default) or whitelist.
    #[serde(default)]
    pub mode: LimitMode,

    /// Server names, matched case-insensitively.
    #[serde(default)]
    pub list: Vec<String>,
}

impl LimitationConfig {
    /// Returns whether a player on the given server passes this limitation.
    ///
    /// Players without a known server always pass.
    pub fn is_allowed(&self, server: Option<&str>) -> bool {
        let Some(name) = server else {
            return true;
        };
        let contains = self.list.iter().any(|s| s.eq_ignore_ascii_case(name));
        match self.mode {
            LimitMode::Blacklist => !contains,
            LimitMode::Whitelist => contains,
        }
    }
}

/// Limitation list mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LimitMode {
    /// Listed servers are excluded.
    #[default]
    Blacklist,
    /// Only listed servers are included.
    Whitelist,
}

/// One timer definition.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimerConfig {
    /// Human-readable description; defaults to the timer id.
    #[serde(default)]
    pub description: Option<String>,

    /// Recurring schedule as a 5-field cron expression.
    #[serde(default)]
    pub cron: Option<String>,

    /// One-shot target as `YYYY-MM-DD HH:MM:SS` in the configured timezone.
    #[serde(default)]
    pub time: Option<String>,

    /// Per-timer server limitation, combined with the global one.
    #[serde(default)]
    pub limitation: Option<LimitationConfig>,

    /// Showcase definitions keyed by kind (`text`, `actionbar`, `title`,
    /// `bossbar`).
    #[serde(default)]
    pub showcases: BTreeMap<String, ShowcaseConfig>,

    /// Actions fired around the target time.
    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

/// One showcase definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowcaseConfig {
    /// Whether this showcase is active.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// How long before the target the showcase starts, as a loose duration.
    #[serde(default, rename = "start-at")]
    pub start_at: Option<String>,

    /// Send interval as a loose duration; defaults per showcase kind.
    #[serde(default)]
    pub interval: Option<String>,

    /// Display text (the title line for `title` showcases).
    #[serde(default)]
    pub text: String,

    /// Subtitle line, only meaningful for `title` showcases.
    #[serde(default)]
    pub subtitle: String,

    /// Post-target display window.
    #[serde(default)]
    pub after: Option<AfterConfig>,

    /// Boss bar color name, only meaningful for `bossbar` showcases.
    #[serde(default)]
    pub color: Option<String>,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            start_at: None,
            interval: None,
            text: String::new(),
            subtitle: String::new(),
            after: None,
            color: None,
        }
    }
}

impl ShowcaseConfig {
    /// Parsed `start-at` window.
    pub fn start_at_duration(&self) -> Option<Duration> {
        self.start_at.as_deref().and_then(parse_duration_loose)
    }

    /// Parsed send interval.
    pub fn interval_duration(&self) -> Option<Duration> {
        self.interval.as_deref().and_then(parse_duration_loose)
    }
}

fn default_enabled() -> bool {
    true
}

/// Post-target display window for a showcase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AfterConfig {
    /// How long past the target the showcase keeps running.
    pub duration: String,

    /// Replacement text shown during the window.
    #[serde(default)]
    pub text: String,
}

impl AfterConfig {
    /// Parsed window duration; `None` or zero disables the window.
    pub fn window(&self) -> Option<Duration> {
        parse_duration_loose(&self.duration).filter(|d| !d.is_zero())
    }
}

/// One action definition, discriminated by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ActionConfig {
    /// Execute a command as the console or as each player.
    Command {
        /// Offset from the target time, loose duration.
        #[serde(default)]
        shift: String,
        /// Who runs the command.
        #[serde(default)]
        executor: CommandExecutor,
        /// Command text; placeholders apply.
        command: String,
        /// Player-name wildcard filter for the `player` executor.
        #[serde(default = "default_wildcard", rename = "match")]
        match_players: String,
    },

    /// Display text to every allowed player.
    Text {
        /// Offset from the target time, loose duration.
        #[serde(default)]
        shift: String,
        /// Where the text goes.
        #[serde(default, rename = "text-type")]
        text_type: TextKind,
        /// Scalar text, or for titles a `[title, subtitle, fade-in, stay,
        /// fade-out]` sequence.
        #[serde(default)]
        info: serde_yaml::Value,
    },

    /// Move matching players to another backend server.
    Transfer {
        /// Offset from the target time, loose duration.
        #[serde(default)]
        shift: String,
        /// Destination server name.
        target: String,
        /// Player-name wildcard filter.
        #[serde(default = "default_wildcard")]
        transferee: String,
    },
}

impl ActionConfig {
    /// Offset from the target time; malformed shifts count as zero.
    pub fn shift(&self) -> Duration {
        let raw = match self {
            Self::Command { shift, .. } | Self::Text { shift, .. } | Self::Transfer { shift, .. } => {
                shift
            }
        };
        parse_duration_loose(raw).unwrap_or_else(Duration::zero)
    }

    /// The `type` tag of this action.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Command { .. } => "command",
            Self::Text { .. } => "text",
            Self::Transfer { .. } => "transfer",
        }
    }
}

fn default_wildcard() -> String {
    "*".to_string()
}

/// Who executes a command action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CommandExecutor {
    /// Each allowed player runs the command themselves.
    #[default]
    Player,
    /// The proxy console runs the command once.
    Console,
}

/// Destination surface for a text action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextKind {
    /// Chat message.
    #[default]
    Message,
    /// Action bar line.
    Actionbar,
    /// Title line.
    Title,
    /// Subtitle line.
    Subtitle,
}

/// One animation definition.
///
/// Two YAML shapes are supported: uniform (`interval` seconds + `text`
/// lines) and advanced (`frames` with per-frame `duration`). `frames`
/// takes precedence when both are present.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnimationConfig {
    /// Uniform frame interval in seconds.
    #[serde(default)]
    pub interval: Option<f64>,

    /// Frame texts for the uniform shape.
    #[serde(default)]
    pub text: Vec<String>,

    /// Per-frame definitions for the advanced shape.
    #[serde(default)]
    pub frames: Vec<FrameConfig>,
}

impl AnimationConfig {
    /// Converts to a core animation.
    pub fn to_animation(&self) -> Animation {
        if !self.frames.is_empty() {
            let frames = self
                .frames
                .iter()
                .map(|f| Frame {
                    duration_ms: seconds_to_ms(f.duration),
                    text: f.text.clone(),
                })
                .collect();
            return Animation::from_frames(frames);
        }

        let interval_ms = seconds_to_ms(self.interval.unwrap_or(1.0));
        Animation::uniform(interval_ms, self.text.clone())
    }
}

/// One frame of an advanced animation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Frame duration in seconds.
    #[serde(default = "default_frame_duration")]
    pub duration: f64,

    /// Frame text.
    #[serde(default)]
    pub text: String,
}

fn default_frame_duration() -> f64 {
    1.0
}

fn seconds_to_ms(seconds: f64) -> u64 {
    ((seconds * 1000.0).round() as i64).max(1) as u64
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Optional log file; stdout when absent.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line compact output.
    #[default]
    Compact,
    /// Default `tracing` formatting.
    Full,
    /// Multi-line human-oriented output.
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = DowncountConfig::from_yaml_str("").unwrap();
        assert_eq!(config.global.lang, "en_us");
        assert_eq!(config.global.timezone, "+00:00");
        assert!(config.timers.is_empty());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = DowncountConfig::from_yaml_str(
            "global:\n  lang: de_de\n  future-option: 42\nbrand-new-section:\n  x: 1\n",
        )
        .unwrap();
        assert_eq!(config.global.lang, "de_de");
    }

    #[test]
    fn test_top_level_must_be_mapping() {
        let err = DowncountConfig::from_yaml_str("- a\n- b\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_syntax_error_is_malformed_document() {
        let err = DowncountConfig::from_yaml_str("timers: [unclosed\n").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedDocument(_)));
    }

    #[test]
    fn test_wrong_value_type_is_invalid_value() {
        let err = DowncountConfig::from_yaml_str("templates: 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValueType(_)));
    }

    #[test]
    fn test_timer_with_tagged_actions() {
        let yaml = r#"
timers:
  maintenance:
    description: Nightly maintenance
    cron: "0 4 * * *"
    actions:
      - type: text
        shift: -10m
        text-type: actionbar
        info: "10 minutes left"
      - type: command
        executor: console
        command: "alert {remaining}"
      - type: transfer
        target: lobby
        transferee: "Admin*"
"#;
        let config = DowncountConfig::from_yaml_str(yaml).unwrap();
        let timer = &config.timers["maintenance"];
        assert_eq!(timer.actions.len(), 3);
        assert_eq!(timer.actions[0].kind(), "text");
        assert_eq!(timer.actions[0].shift(), Duration::minutes(-10));
        assert_eq!(timer.actions[1].kind(), "command");
        assert_eq!(timer.actions[1].shift(), Duration::zero());
        assert!(matches!(
            &timer.actions[2],
            ActionConfig::Transfer { target, transferee, .. }
                if target == "lobby" && transferee == "Admin*"
        ));
    }

    #[test]
    fn test_templates_and_flags() {
        let yaml = "templates:\n  greeting: \"Hello, {player}!\"\nflags:\n  broadcast: true\n";
        let config = DowncountConfig::from_yaml_str(yaml).unwrap();
        let settings = config.to_settings();
        assert_eq!(
            settings.templates().get("greeting").map(String::as_str),
            Some("Hello, {player}!")
        );
        assert!(settings.flag("broadcast"));
    }

    #[test]
    fn test_limitation_modes() {
        let blacklist = LimitationConfig {
            mode: LimitMode::Blacklist,
            list: vec!["Lobby".to_string()],
        };
        assert!(!blacklist.is_allowed(Some("lobby")));
        assert!(blacklist.is_allowed(Some("survival")));
        assert!(blacklist.is_allowed(None));

        let whitelist = LimitationConfig {
            mode: LimitMode::Whitelist,
            list: vec!["lobby".to_string()],
        };
        assert!(whitelist.is_allowed(Some("LOBBY")));
        assert!(!whitelist.is_allowed(Some("survival")));
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("+08:00"), FixedOffset::east_opt(8 * 3600));
        assert_eq!(parse_utc_offset("-0530"), FixedOffset::west_opt(5 * 3600 + 30 * 60));
        assert_eq!(parse_utc_offset("Z"), FixedOffset::east_opt(0));
        assert_eq!(parse_utc_offset("utc"), FixedOffset::east_opt(0));
        assert_eq!(parse_utc_offset("Asia/Shanghai"), None);
        assert_eq!(parse_utc_offset("+25:00"), None);
    }

    #[test]
    fn test_animation_shapes() {
        let yaml = r#"
animations:
  dots:
    interval: 0.5
    text: [".", "..", "..."]
  pulse:
    frames:
      - { duration: 0.2, text: "!" }
      - { duration: 1.8, text: " " }
"#;
        let config = DowncountConfig::from_yaml_str(yaml).unwrap();
        let dots = config.animations["dots"].to_animation();
        assert_eq!(dots.total_ms(), 1500);
        let pulse = config.animations["pulse"].to_animation();
        assert_eq!(pulse.total_ms(), 2000);
        assert_eq!(pulse.frame_at(100), "!");
    }

    #[test]
    fn test_showcase_defaults() {
        let yaml = r#"
timers:
  t:
    time: "2030-01-01 00:00:00"
    showcases:
      bossbar:
        text: "{remaining}"
        start-at: 1h
        color: red
"#;
        let config = DowncountConfig::from_yaml_str(yaml).unwrap();
        let sc = &config.timers["t"].showcases["bossbar"];
        assert!(sc.enabled);
        assert_eq!(sc.start_at_duration(), Some(Duration::hours(1)));
        assert_eq!(sc.interval_duration(), None);
        assert_eq!(sc.color.as_deref(), Some("red"));
    }
}
