//! Per-timer rendering context shared by showcases and actions.
//!
//! Bundles player selection, limitation checks, and the one placeholder
//! expansion entry point so display code never talks to the engine directly.

use std::sync::Arc;

use downcount_core::{Catalog, Engine, EvalContext};

use crate::host::{Host, Player};

/// Produces the evaluation context for the current instant.
pub type EvalSupplier = Arc<dyn Fn() -> EvalContext + Send + Sync>;

/// Player limitation predicate.
pub type AllowedFn = Arc<dyn Fn(&Player) -> bool + Send + Sync>;

/// Rendering context for one timer.
///
/// Cheap to clone; all parts are shared.
#[derive(Clone)]
pub struct RenderContext {
    host: Arc<dyn Host>,
    engine: Engine,
    allowed: AllowedFn,
    eval: EvalSupplier,
}

impl RenderContext {
    /// Creates a rendering context.
    pub fn new(host: Arc<dyn Host>, engine: Engine, allowed: AllowedFn, eval: EvalSupplier) -> Self {
        Self {
            host,
            engine,
            allowed,
            eval,
        }
    }

    /// The proxy host.
    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    /// The message catalog in use.
    pub fn catalog(&self) -> &Arc<Catalog> {
        self.engine.catalog()
    }

    /// All currently connected players, unfiltered.
    pub async fn players(&self) -> Vec<Player> {
        self.host.players().await
    }

    /// Whether the limitations allow this player.
    pub fn allowed(&self, player: &Player) -> bool {
        (self.allowed)(player)
    }

    /// Renders text with all placeholders applied, without player context.
    pub fn render(&self, text: &str) -> String {
        let ctx = (self.eval)();
        self.engine.apply(text, &ctx)
    }

    /// Renders text with all placeholders applied for one player.
    pub fn render_for(&self, player: &Player, text: &str) -> String {
        let ctx = (self.eval)().with_vars(player.placeholder_vars());
        self.engine.apply(text, &ctx)
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use chrono::Utc;
    use downcount_core::{Catalog, MissPolicy, Settings};
    use std::collections::BTreeMap;

    /// A context over a bare engine that allows every player.
    pub fn render_context(host: Arc<dyn Host>, timer_id: &'static str) -> RenderContext {
        let settings = Settings::new(
            BTreeMap::new(),
            BTreeMap::new(),
            BTreeMap::new(),
            MissPolicy::Token,
        );
        let engine = Engine::new(Arc::new(settings), Arc::new(Catalog::builtin_en_us()));
        RenderContext::new(
            host,
            engine,
            Arc::new(|_| true),
            Arc::new(move || EvalContext::new(timer_id, "", Utc::now())),
        )
    }
}
