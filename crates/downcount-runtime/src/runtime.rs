//! Runtime orchestration: lifecycle, reload, and status reporting.
//!
//! The host adapter owns a [`DowncountRuntime`] and drives it with explicit
//! calls: `enable` from its startup hook, `reload` from its admin command,
//! `disable` from shutdown, and the player methods from its connection
//! events. No piece of this crate registers itself with the host.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use downcount_core::{Engine, PlaceholderRegistry, ResolutionBridge, TemplateError};
use parking_lot::RwLock;
use tracing::{error, info};

use crate::config::{ConfigLoader, DowncountConfig, validate_config};
use crate::error::RuntimeResult;
use crate::host::{Host, Player};
use crate::i18n;
use crate::logging;
use crate::timer::{TimerInstance, TimerRunner};

/// Summary of a successful configuration (re)load.
#[derive(Debug, Clone)]
pub struct ReloadReport {
    /// Number of live timers.
    pub timers: usize,
    /// Number of configured templates.
    pub templates: usize,
    /// Templates dropped for referencing themselves.
    pub dropped_templates: Vec<TemplateError>,
}

/// One timer's status line for the host's command interface.
#[derive(Debug, Clone)]
pub struct TimerStatus {
    /// Timer id.
    pub id: String,
    /// Next occurrence, RFC 3339, or `None` when nothing is pending.
    pub next: Option<String>,
}

/// The runtime root: ties configuration, the placeholder bridge, and the
/// timer runner together.
///
/// # Reload semantics
///
/// A reload builds the complete new state (settings, catalog, registry,
/// timer instances) before anything active is touched. Any failure leaves
/// the previous state fully in place; on success the registry is swapped
/// into the bridge atomically and the instance map is replaced wholesale.
pub struct DowncountRuntime {
    host: Arc<dyn Host>,
    data_dir: PathBuf,
    bridge: Arc<ResolutionBridge>,
    runner: TimerRunner,
    active: RwLock<Option<Arc<DowncountConfig>>>,
}

impl DowncountRuntime {
    /// Creates a disabled runtime rooted at the plugin data directory.
    pub fn new(host: Arc<dyn Host>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            host,
            data_dir: data_dir.into(),
            bridge: Arc::new(ResolutionBridge::new()),
            runner: TimerRunner::new(),
            active: RwLock::new(None),
        }
    }

    /// The bridge the host's placeholder consumer should call into.
    pub fn bridge(&self) -> &Arc<ResolutionBridge> {
        &self.bridge
    }

    /// Whether a configuration has been applied.
    pub fn is_enabled(&self) -> bool {
        self.active.read().is_some()
    }

    /// The active configuration snapshot, if enabled.
    pub fn config(&self) -> Option<Arc<DowncountConfig>> {
        self.active.read().clone()
    }

    /// Loads the configuration, applies it, and starts the tick loop.
    pub async fn enable(&mut self) -> RuntimeResult<ReloadReport> {
        let report = self.apply_config().await?;
        if let Some(config) = self.config() {
            logging::init_from_config(&config.logging);
        }
        self.runner.start();
        info!(timers = report.timers, "downcount enabled");
        Ok(report)
    }

    /// Reloads the configuration.
    ///
    /// On failure the previously applied configuration, registry, and timer
    /// instances all stay active.
    pub async fn reload(&mut self) -> RuntimeResult<ReloadReport> {
        match self.apply_config().await {
            Ok(report) => {
                info!(timers = report.timers, "downcount reloaded");
                Ok(report)
            }
            Err(e) => {
                error!(error = %e, "Reload failed, keeping previous configuration");
                Err(e)
            }
        }
    }

    /// Stops the tick loop and tears down all timers.
    pub async fn disable(&mut self) {
        self.runner.stop().await;
        *self.active.write() = None;
        info!("downcount disabled");
    }

    /// Status lines for every timer, sorted by id.
    pub async fn status(&self) -> Vec<TimerStatus> {
        self.runner
            .statuses()
            .await
            .into_iter()
            .map(|(id, next)| TimerStatus { id, next })
            .collect()
    }

    /// Forwards a player join from the host.
    pub async fn player_joined(&self, player: &Player) {
        self.runner.player_joined(player).await;
    }

    /// Forwards a player server switch from the host.
    pub async fn player_switched(&self, player: &Player) {
        self.runner.player_switched(player).await;
    }

    /// Forwards a player disconnect from the host.
    pub async fn player_left(&self, player: &Player) {
        self.runner.player_left(player).await;
    }

    /// Builds the complete new state, then commits it.
    async fn apply_config(&mut self) -> RuntimeResult<ReloadReport> {
        let config = ConfigLoader::new().search_path(&self.data_dir).load()?;
        validate_config(&config)?;

        let catalog = i18n::load_catalog(&self.data_dir, &config.global.lang);
        let settings = Arc::new(config.to_settings());
        let engine = Engine::new(settings, Arc::new(catalog));

        let (registry, dropped) = PlaceholderRegistry::build(&engine);

        let mut instances = HashMap::new();
        for (id, timer) in &config.timers {
            instances.insert(
                id.clone(),
                TimerInstance::new(
                    id.clone(),
                    timer.clone(),
                    &config.global,
                    engine.clone(),
                    Arc::clone(&self.host),
                ),
            );
        }

        // commit point: everything after this swaps whole snapshots
        self.bridge.install(Arc::new(registry));
        self.runner.replace_instances(instances).await;

        let report = ReloadReport {
            timers: config.timers.len(),
            templates: config.templates.len(),
            dropped_templates: dropped,
        };
        *self.active.write() = Some(Arc::new(config));
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::RecordingHost;
    use chrono::Utc;
    use downcount_core::EvalContext;

    fn eval_ctx() -> EvalContext {
        EvalContext::new("test", "", Utc::now()).with_var("player", "Ari")
    }

    #[tokio::test]
    async fn test_enable_without_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let host = Arc::new(RecordingHost::with_players(vec![]));
        let mut runtime = DowncountRuntime::new(host, dir.path());

        let report = runtime.enable().await.unwrap();
        assert_eq!(report.timers, 0);
        assert!(runtime.is_enabled());
        assert!(runtime.bridge().is_loaded());
        runtime.disable().await;
    }

    #[tokio::test]
    async fn test_enable_builds_registry_and_timers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("downcount.yaml"),
            "templates:\n  greeting: \"Hello, {player}!\"\ntimers:\n  t:\n    cron: \"0 4 * * *\"\n",
        )
        .unwrap();

        let host = Arc::new(RecordingHost::with_players(vec![]));
        let mut runtime = DowncountRuntime::new(host, dir.path());

        let report = runtime.enable().await.unwrap();
        assert_eq!(report.timers, 1);
        assert_eq!(report.templates, 1);
        assert!(report.dropped_templates.is_empty());
        assert_eq!(runtime.bridge().resolve("greeting", &eval_ctx()), "Hello, Ari!");
        runtime.disable().await;
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("downcount.yaml");
        std::fs::write(&path, "templates:\n  greeting: \"Hello, {player}!\"\n").unwrap();

        let host = Arc::new(RecordingHost::with_players(vec![]));
        let mut runtime = DowncountRuntime::new(host, dir.path());
        runtime.enable().await.unwrap();

        let before = runtime.bridge().resolve("greeting", &eval_ctx());
        assert_eq!(before, "Hello, Ari!");

        // break the config on disk, then reload
        std::fs::write(&path, "templates: [not-a-mapping\n").unwrap();
        assert!(runtime.reload().await.is_err());

        // previous registry stays active, resolution is unchanged
        assert_eq!(runtime.bridge().resolve("greeting", &eval_ctx()), before);
        assert!(runtime.is_enabled());
        runtime.disable().await;
    }

    #[tokio::test]
    async fn test_successful_reload_swaps_registry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("downcount.yaml");
        std::fs::write(&path, "templates:\n  motd: \"old\"\n").unwrap();

        let host = Arc::new(RecordingHost::with_players(vec![]));
        let mut runtime = DowncountRuntime::new(host, dir.path());
        runtime.enable().await.unwrap();
        assert_eq!(runtime.bridge().resolve("motd", &eval_ctx()), "old");

        std::fs::write(&path, "templates:\n  motd: \"new\"\n").unwrap();
        runtime.reload().await.unwrap();
        assert_eq!(runtime.bridge().resolve("motd", &eval_ctx()), "new");
        runtime.disable().await;
    }

    #[tokio::test]
    async fn test_cyclic_template_reported_but_load_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("downcount.yaml"),
            "templates:\n  a: \"{a}\"\n  ok: \"fine\"\n",
        )
        .unwrap();

        let host = Arc::new(RecordingHost::with_players(vec![]));
        let mut runtime = DowncountRuntime::new(host, dir.path());

        let report = runtime.enable().await.unwrap();
        assert_eq!(report.dropped_templates.len(), 1);
        assert_eq!(runtime.bridge().resolve("ok", &eval_ctx()), "fine");
        // the cyclic entry misses and falls back to the token
        assert_eq!(runtime.bridge().resolve("a", &eval_ctx()), "a");
        runtime.disable().await;
    }
}
