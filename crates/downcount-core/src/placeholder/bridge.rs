//! Resolution bridge between the host's text consumer and the registry.
//!
//! The bridge holds the single piece of shared mutable state in the core:
//! an atomically swappable registry snapshot. `resolve` is total — it always
//! returns a string — and safe to call concurrently with a reload. In-flight
//! calls complete against whichever snapshot they observed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::info;

use super::registry::PlaceholderRegistry;
use crate::context::EvalContext;
use crate::settings::MissPolicy;

/// Entry point the placeholder-consuming side calls into.
///
/// Starts in the unloaded state, where every name resolves to itself.
/// [`install`](Self::install) moves it to loaded; every subsequent install
/// swaps the snapshot atomically.
#[derive(Debug, Default)]
pub struct ResolutionBridge {
    registry: RwLock<Option<Arc<PlaceholderRegistry>>>,
    resolutions: AtomicU64,
    misses: AtomicU64,
}

impl ResolutionBridge {
    /// Creates a bridge in the unloaded state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a registry snapshot, replacing any previous one.
    pub fn install(&self, registry: Arc<PlaceholderRegistry>) {
        info!(entries = registry.len(), "Installing placeholder registry");
        *self.registry.write() = Some(registry);
    }

    /// Returns `true` once a registry has been installed.
    pub fn is_loaded(&self) -> bool {
        self.registry.read().is_some()
    }

    /// The current registry snapshot, if any.
    pub fn snapshot(&self) -> Option<Arc<PlaceholderRegistry>> {
        self.registry.read().clone()
    }

    /// Resolves a placeholder name against a context.
    ///
    /// Never fails outward: an unknown name returns the name itself (or an
    /// empty string under the blank miss policy), and before the first
    /// install every name resolves to itself.
    pub fn resolve(&self, name: &str, ctx: &EvalContext) -> String {
        self.resolutions.fetch_add(1, Ordering::Relaxed);

        let Some(registry) = self.snapshot() else {
            return name.to_string();
        };

        match registry.lookup(name) {
            Some(definition) => definition.resolve(ctx),
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                match registry.miss_policy() {
                    MissPolicy::Token => name.to_string(),
                    MissPolicy::Blank => String::new(),
                }
            }
        }
    }

    /// Total number of resolution calls since creation.
    pub fn resolutions(&self) -> u64 {
        self.resolutions.load(Ordering::Relaxed)
    }

    /// Number of resolution calls that missed the registry.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
