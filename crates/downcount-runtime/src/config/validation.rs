//! Configuration validation utilities.

use chrono::NaiveDateTime;
use downcount_core::{Cron, parse_duration_loose};

use super::error::{ConfigError, ConfigResult};
use super::schema::{
    ActionConfig, AnimationConfig, DowncountConfig, ONE_SHOT_TIME_FORMAT, ShowcaseConfig,
    TimerConfig,
};

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const SHOWCASE_KINDS: &[&str] = &["text", "actionbar", "title", "bossbar"];
const BOSSBAR_COLORS: &[&str] = &["pink", "blue", "red", "green", "yellow", "purple", "white"];

/// Validates the entire configuration.
pub fn validate_config(config: &DowncountConfig) -> ConfigResult<()> {
    validate_global(config)?;
    for (id, timer) in &config.timers {
        validate_timer(id, timer)?;
    }
    for (id, animation) in &config.animations {
        validate_animation(id, animation)?;
    }
    Ok(())
}

fn validate_global(config: &DowncountConfig) -> ConfigResult<()> {
    if !VALID_LOG_LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
        return Err(ConfigError::validation(format!(
            "Invalid log level: {}. Valid values are: {:?}",
            config.logging.level, VALID_LOG_LEVELS
        )));
    }

    // surfaces a bad timezone before any timer math runs
    config.global.zone()?;

    Ok(())
}

fn validate_timer(id: &str, timer: &TimerConfig) -> ConfigResult<()> {
    if id.is_empty() {
        return Err(ConfigError::missing_field("timers.<id>"));
    }

    if timer.cron.is_none() && timer.time.is_none() {
        return Err(ConfigError::validation(format!(
            "Timer '{id}' needs either 'cron' or 'time'"
        )));
    }

    if let Some(expr) = &timer.cron {
        Cron::parse(expr).map_err(|e| {
            ConfigError::validation(format!("Timer '{id}' has an invalid cron expression: {e}"))
        })?;
    }

    if let Some(time) = &timer.time {
        NaiveDateTime::parse_from_str(time, ONE_SHOT_TIME_FORMAT).map_err(|_| {
            ConfigError::validation(format!(
                "Timer '{id}' has an invalid time '{time}': expected YYYY-MM-DD HH:MM:SS"
            ))
        })?;
    }

    for (key, showcase) in &timer.showcases {
        validate_showcase(id, key, showcase)?;
    }

    for action in &timer.actions {
        validate_action(id, action)?;
    }

    Ok(())
}

fn validate_showcase(timer_id: &str, key: &str, showcase: &ShowcaseConfig) -> ConfigResult<()> {
    let kind = key.to_lowercase();
    if !SHOWCASE_KINDS.contains(&kind.as_str()) {
        return Err(ConfigError::validation(format!(
            "Timer '{timer_id}' has unknown showcase kind '{key}'. Valid kinds are: {SHOWCASE_KINDS:?}"
        )));
    }

    for (field, value) in [("start-at", &showcase.start_at), ("interval", &showcase.interval)] {
        if let Some(raw) = value
            && parse_duration_loose(raw).is_none()
        {
            return Err(ConfigError::validation(format!(
                "Timer '{timer_id}' showcase '{key}': invalid {field} duration '{raw}'"
            )));
        }
    }

    if let Some(after) = &showcase.after
        && parse_duration_loose(&after.duration).is_none()
    {
        return Err(ConfigError::validation(format!(
            "Timer '{timer_id}' showcase '{key}': invalid after duration '{}'",
            after.duration
        )));
    }

    if kind == "bossbar"
        && let Some(color) = &showcase.color
        && !BOSSBAR_COLORS.contains(&color.to_lowercase().as_str())
    {
        return Err(ConfigError::validation(format!(
            "Timer '{timer_id}' bossbar: unknown color '{color}'. Valid colors are: {BOSSBAR_COLORS:?}"
        )));
    }

    Ok(())
}

fn validate_action(timer_id: &str, action: &ActionConfig) -> ConfigResult<()> {
    let shift = match action {
        ActionConfig::Command { shift, command, .. } => {
            if command.trim().is_empty() {
                return Err(ConfigError::validation(format!(
                    "Timer '{timer_id}': command action has an empty command"
                )));
            }
            shift
        }
        ActionConfig::Text { shift, .. } => shift,
        ActionConfig::Transfer { shift, target, .. } => {
            if target.trim().is_empty() {
                return Err(ConfigError::validation(format!(
                    "Timer '{timer_id}': transfer action has an empty target"
                )));
            }
            shift
        }
    };

    if !shift.is_empty() && parse_duration_loose(shift).is_none() {
        return Err(ConfigError::validation(format!(
            "Timer '{timer_id}': {} action has an invalid shift '{shift}'",
            action.kind()
        )));
    }

    Ok(())
}

fn validate_animation(id: &str, animation: &AnimationConfig) -> ConfigResult<()> {
    if let Some(interval) = animation.interval
        && interval <= 0.0
    {
        return Err(ConfigError::validation(format!(
            "Animation '{id}': interval must be positive"
        )));
    }
    for frame in &animation.frames {
        if frame.duration <= 0.0 {
            return Err(ConfigError::validation(format!(
                "Animation '{id}': frame durations must be positive"
            )));
        }
    }
    Ok(())
}
