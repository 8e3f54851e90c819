//! # Downcount
//!
//! A countdown timer and placeholder-resolution framework for proxy hosts.
//!
//! ## Overview
//!
//! Downcount turns a YAML timer configuration into scheduled actions,
//! periodic displays, and resolvable placeholders, behind a host seam the
//! embedding proxy adapter implements.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌─────────────────────┐
//! │  Proxy host  │────▶│ DowncountRuntime  │────▶│ TimerRunner (tick)  │──▶ actions
//! │  (adapter)   │     │ (config + reload) │     │                     │──▶ showcases
//! └──────────────┘     └───────────────────┘     └─────────────────────┘
//!        │                      │
//!        │ resolve(name, ctx)   │ install (atomic swap)
//!        ▼                      ▼
//! ┌──────────────────────────────────────┐
//! │ ResolutionBridge → PlaceholderRegistry│
//! └──────────────────────────────────────┘
//! ```
//!
//! - **Runtime**: loads and validates configuration, owns the reload cycle
//! - **Bridge**: the total `resolve(name, ctx)` entry the host's text
//!   consumer calls into
//! - **Timers**: cron or one-shot targets driving actions and showcases
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use downcount::prelude::*;
//!
//! let mut runtime = DowncountRuntime::new(my_host_adapter, data_dir);
//! runtime.enable().await?;
//!
//! // hand the bridge to the placeholder-consuming API:
//! let text = runtime.bridge().resolve("greeting", &ctx);
//!
//! // from the admin command:
//! runtime.reload().await?;
//! ```

pub use downcount_core as core;
pub use downcount_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use downcount::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use downcount_runtime::runtime::{DowncountRuntime, ReloadReport, TimerStatus};

    // Host seam - implemented by the proxy adapter
    pub use downcount_runtime::host::{
        BossbarColor, Host, HostError, HostResult, Player, TitleTimes,
    };

    // Configuration
    pub use downcount_runtime::config::{
        ConfigError, ConfigLoader, DowncountConfig, validate_config,
    };

    // Placeholder resolution
    pub use downcount_core::{
        Catalog, Engine, EvalContext, MissPolicy, PlaceholderDefinition, PlaceholderRegistry,
        ResolutionBridge, Settings, TemplateError,
    };

    // Schedules
    pub use downcount_core::{Cron, CronError};
}
