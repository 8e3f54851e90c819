//! Configuration module for the downcount runtime.
//!
//! Provides YAML-based configuration loading and validation for timers,
//! templates, animations, and global options.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, load_config, load_config_from_file};
pub use schema::{
    ActionConfig, AfterConfig, AnimationConfig, CommandExecutor, DowncountConfig, FrameConfig,
    GlobalConfig, LimitMode, LimitationConfig, LogFormat, LoggingConfig, MissMode,
    ONE_SHOT_TIME_FORMAT, ShowcaseConfig, TextKind, TimerConfig,
};
pub use validation::validate_config;
