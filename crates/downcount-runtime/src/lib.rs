//! # Downcount Runtime
//!
//! Host-facing runtime of the downcount countdown framework.
//!
//! Everything the proxy host interacts with lives here:
//!
//! - **Configuration**: figment/YAML loading, schema, validation
//!   ([`config`])
//! - **The host seam**: the [`Host`] trait the proxy adapter implements,
//!   and the explicit lifecycle/player calls it makes ([`host`],
//!   [`DowncountRuntime`])
//! - **Timers**: per-timer instances and the 250 ms tick loop ([`timer`])
//! - **Actions** fired at the target time and **showcases** displayed
//!   while one is pending ([`action`], [`showcase`])
//! - **Logging** setup from the config's `logging` section ([`logging`])
//!
//! ## Wiring
//!
//! ```rust,ignore
//! use downcount_runtime::{DowncountRuntime, host::Host};
//!
//! let mut runtime = DowncountRuntime::new(proxy_adapter, data_dir);
//! runtime.enable().await?;
//!
//! // hand the bridge to the placeholder-consuming API
//! let bridge = runtime.bridge().clone();
//!
//! // from the admin command:
//! runtime.reload().await?;
//! ```

pub mod action;
pub mod config;
pub mod error;
pub mod host;
pub mod i18n;
pub mod logging;
pub mod render;
pub mod runtime;
pub mod showcase;
pub mod timer;

pub use config::{ConfigError, ConfigLoader, DowncountConfig, validate_config};
pub use error::{RuntimeError, RuntimeResult};
pub use host::{BossbarColor, Host, HostError, HostResult, Player, TitleTimes};
pub use render::RenderContext;
pub use runtime::{DowncountRuntime, ReloadReport, TimerStatus};
pub use timer::{TimerInstance, TimerRunner};

/// Prelude for common imports.
pub mod prelude {
    pub use super::config::{ConfigLoader, DowncountConfig, validate_config};
    pub use super::host::{Host, Player, TitleTimes};
    pub use super::runtime::{DowncountRuntime, ReloadReport, TimerStatus};
}
