//! The tick loop driving all timer instances.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::instance::TimerInstance;
use crate::host::Player;

const TICK_INTERVAL: std::time::Duration = std::time::Duration::from_millis(250);

/// Owns the timer instances and ticks them four times a second.
///
/// Reloads replace the instance map wholesale; the loop picks up the new
/// map on its next tick.
pub struct TimerRunner {
    instances: Arc<Mutex<HashMap<String, TimerInstance>>>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl TimerRunner {
    /// Creates a runner with no instances and no running loop.
    pub fn new() -> Self {
        Self {
            instances: Arc::new(Mutex::new(HashMap::new())),
            cancel: CancellationToken::new(),
            handle: None,
        }
    }

    /// Replaces all instances, disposing the old ones first.
    pub async fn replace_instances(&self, new: HashMap<String, TimerInstance>) {
        let mut guard = self.instances.lock().await;
        for instance in guard.values() {
            instance.dispose().await;
        }
        *guard = new;
        info!(timers = guard.len(), "Timer instances replaced");
    }

    /// Starts the tick loop. A second call is a no-op while running.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }

        let instances = Arc::clone(&self.instances);
        let cancel = self.cancel.clone();
        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        let now = Utc::now();
                        let mut guard = instances.lock().await;
                        for instance in guard.values_mut() {
                            instance.tick(now).await;
                        }
                    }
                }
            }
            debug!("Timer tick loop stopped");
        }));
    }

    /// Stops the tick loop and disposes every instance.
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        self.cancel = CancellationToken::new();

        let mut guard = self.instances.lock().await;
        for instance in guard.values() {
            instance.dispose().await;
        }
        guard.clear();
    }

    /// Number of live timer instances.
    pub async fn timer_count(&self) -> usize {
        self.instances.lock().await.len()
    }

    /// The next occurrence of one timer.
    pub async fn peek_next(&self, timer_id: &str) -> Option<String> {
        self.instances.lock().await.get(timer_id)?.peek_next()
    }

    /// Every timer id with its next occurrence, sorted by id.
    pub async fn statuses(&self) -> Vec<(String, Option<String>)> {
        let guard = self.instances.lock().await;
        let mut statuses: Vec<_> = guard
            .iter()
            .map(|(id, instance)| (id.clone(), instance.peek_next()))
            .collect();
        statuses.sort_by(|a, b| a.0.cmp(&b.0));
        statuses
    }

    /// Refreshes boss bars for a player that just joined.
    pub async fn player_joined(&self, player: &Player) {
        let guard = self.instances.lock().await;
        for instance in guard.values() {
            instance.refresh_for(player).await;
        }
    }

    /// Refreshes boss bars for a player that switched servers.
    pub async fn player_switched(&self, player: &Player) {
        self.player_joined(player).await;
    }

    /// Drops boss bars for a disconnecting player.
    pub async fn player_left(&self, player: &Player) {
        let guard = self.instances.lock().await;
        for instance in guard.values() {
            instance.hide_for(player).await;
        }
    }
}

impl Default for TimerRunner {
    fn default() -> Self {
        Self::new()
    }
}
