//! # Downcount Core
//!
//! Host-independent engine of the downcount countdown framework.
//!
//! This crate provides everything that does not touch the proxy host or the
//! filesystem:
//!
//! - **Placeholder resolution**: the expansion [`Engine`], the
//!   [`PlaceholderRegistry`] built from configured templates, and the
//!   [`ResolutionBridge`] the host's text consumer calls into
//! - **Evaluation context**: the per-render [`EvalContext`] snapshot
//! - **Settings**: the immutable [`Settings`] snapshot a registry is built
//!   from, replaced wholesale on every reload
//! - **Time**: 5-field [`Cron`] schedules, loose duration parsing, and
//!   remaining-time formatting
//! - **Animations** and the **i18n** message [`Catalog`]
//!
//! ## Snapshot discipline
//!
//! Every value here is immutable once constructed except the bridge's
//! registry slot, which is swapped as a whole `Arc` under a short write
//! lock. Concurrent resolutions therefore always observe one complete
//! registry, never a half-built one.
//!
//! ## Example
//!
//! ```rust,ignore
//! use downcount_core::{Engine, EvalContext, PlaceholderRegistry, ResolutionBridge};
//!
//! let engine = Engine::new(settings, catalog);
//! let (registry, dropped) = PlaceholderRegistry::build(&engine);
//!
//! let bridge = ResolutionBridge::new();
//! bridge.install(registry.into());
//!
//! let ctx = EvalContext::new("launch", "Launch window", Utc::now())
//!     .with_var("player", "Ari");
//! assert_eq!(bridge.resolve("greeting", &ctx), "Hello, Ari!");
//! ```

pub mod animation;
pub mod context;
pub mod error;
pub mod i18n;
pub mod placeholder;
pub mod settings;
pub mod time;

pub use animation::{Animation, Frame};
pub use context::EvalContext;
pub use error::{TemplateError, TemplateResult};
pub use i18n::Catalog;
pub use placeholder::{
    Engine, PlaceholderDefinition, PlaceholderRegistry, ResolutionBridge, Resolver,
};
pub use settings::{MissPolicy, Settings};
pub use time::{Cron, CronError, format_hms, parse_duration_loose};

/// Prelude for common imports.
pub mod prelude {
    pub use super::{
        Animation, Catalog, Cron, Engine, EvalContext, MissPolicy, PlaceholderDefinition,
        PlaceholderRegistry, ResolutionBridge, Settings, TemplateError,
    };
}
