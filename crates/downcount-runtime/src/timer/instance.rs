//! A single live timer: target computation, action scheduling, showcases.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Offset, TimeZone, Timelike, Utc};
use downcount_core::{Cron, Engine, EvalContext};
use parking_lot::RwLock;
use tracing::debug;

use crate::action::{self, Action};
use crate::config::{
    GlobalConfig, LimitationConfig, ONE_SHOT_TIME_FORMAT, ShowcaseConfig, TimerConfig,
};
use crate::host::{Host, Player};
use crate::render::RenderContext;
use crate::showcase::{
    self, BossbarShowcase, ProgressSupplier, ShowcaseKind, ShowcaseSlot, TextSupplier,
};

/// How a timer computes its targets.
enum Schedule {
    /// Recurring 5-field cron schedule.
    Cron(Cron),
    /// Single fixed local date-time.
    Once(NaiveDateTime),
    /// No valid schedule; the timer stays idle.
    Unscheduled,
}

/// Target state shared with the render-context closures.
struct TargetState {
    now: DateTime<Utc>,
    target: Option<DateTime<FixedOffset>>,
    target_text: String,
}

/// One action waiting for its fire time within the current target cycle.
struct ScheduledAction {
    at: DateTime<Utc>,
    action: Arc<dyn Action>,
    fired: bool,
}

/// A live timer instance.
///
/// Owned by the [`TimerRunner`](crate::timer::TimerRunner) and driven by its
/// tick. When the current target expires the instance computes the next one
/// and rebuilds its action schedule and showcase slots from scratch.
pub struct TimerInstance {
    id: String,
    config: TimerConfig,
    schedule: Schedule,
    zone: FixedOffset,
    shared: Arc<RwLock<TargetState>>,
    rc: Arc<RenderContext>,
    scheduled: Vec<ScheduledAction>,
    slots: Vec<ShowcaseSlot>,
    bossbar: Option<Arc<BossbarShowcase>>,
    next_target: Option<DateTime<FixedOffset>>,
    expire_at: DateTime<Utc>,
}

impl TimerInstance {
    /// Creates an instance for one timer config.
    ///
    /// Schedule specs were validated at load time; anything that still fails
    /// to parse leaves the timer unscheduled rather than failing the build.
    pub fn new(
        id: String,
        config: TimerConfig,
        global: &GlobalConfig,
        engine: Engine,
        host: Arc<dyn Host>,
    ) -> Self {
        let schedule = parse_schedule(&config);
        let zone = global.zone().unwrap_or_else(|_| Utc.fix());

        let shared = Arc::new(RwLock::new(TargetState {
            now: Utc::now(),
            target: None,
            target_text: String::new(),
        }));

        let description = config.description.clone().unwrap_or_else(|| id.clone());
        let rc = Arc::new(RenderContext::new(
            host,
            engine,
            allowed_fn(global.limitation.clone(), config.limitation.clone()),
            eval_supplier(id.clone(), description, Arc::clone(&shared)),
        ));

        let mut instance = Self {
            id,
            config,
            schedule,
            zone,
            shared,
            rc,
            scheduled: Vec::new(),
            slots: Vec::new(),
            bossbar: None,
            next_target: None,
            expire_at: DateTime::UNIX_EPOCH,
        };
        instance.rebuild_for_new_target();
        instance
    }

    /// The timer id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The next occurrence, RFC 3339 formatted.
    pub fn peek_next(&self) -> Option<String> {
        self.next_target.map(|t| t.to_rfc3339())
    }

    /// Advances the timer to `now`: recomputes the target when the previous
    /// cycle expired, fires due actions, and updates showcases.
    pub async fn tick(&mut self, now: DateTime<Utc>) {
        self.shared.write().now = now;
        self.ensure_next_target(now);
        self.fire_due_actions(now);
        self.update_showcases(now).await;
    }

    fn ensure_next_target(&mut self, now: DateTime<Utc>) {
        if self.next_target.is_none() {
            self.next_target = self.compute_next_target(now);
            self.rebuild_for_new_target();
            return;
        }
        if now > self.expire_at {
            self.next_target = self.compute_next_target(now);
            self.rebuild_for_new_target();
        }
    }

    fn compute_next_target(&self, now: DateTime<Utc>) -> Option<DateTime<FixedOffset>> {
        let zoned = now.with_timezone(&self.zone);
        let zoned = zoned
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(zoned);

        match &self.schedule {
            Schedule::Once(naive) => {
                let target = self.zone.from_local_datetime(naive).single()?;
                (target > zoned).then_some(target)
            }
            Schedule::Cron(cron) => cron.next_after(zoned),
            Schedule::Unscheduled => None,
        }
    }

    /// Rebuilds the action schedule and showcase slots for the current
    /// target. With no target everything is torn down.
    fn rebuild_for_new_target(&mut self) {
        self.scheduled.clear();
        self.slots.clear();
        self.bossbar = None;
        self.expire_at = DateTime::UNIX_EPOCH;

        {
            let mut state = self.shared.write();
            state.target = self.next_target;
            state.target_text = self
                .next_target
                .map(|t| t.format(ONE_SHOT_TIME_FORMAT).to_string())
                .unwrap_or_default();
        }

        let Some(target) = self.next_target else {
            return;
        };
        let target_utc = target.with_timezone(&Utc);
        self.expire_at = target_utc;

        for action_config in &self.config.actions {
            let at = target_utc + action_config.shift();
            self.scheduled.push(ScheduledAction {
                at,
                action: action::create(action_config),
                fired: false,
            });
            if at > self.expire_at {
                self.expire_at = at;
            }
        }

        for (key, sc) in &self.config.showcases {
            if !sc.enabled {
                continue;
            }
            let Some(kind) = ShowcaseKind::from_key(key) else {
                continue;
            };

            let text = text_supplier(&self.shared, sc);
            let progress = progress_supplier(&self.shared, sc);
            let (built, bossbar) = showcase::create(kind, &self.id, sc, text, progress);

            if kind.allows_after()
                && let Some(after) = &sc.after
                && let Some(window) = after.window()
            {
                let end = target_utc + window;
                if end > self.expire_at {
                    self.expire_at = end;
                }
            }

            if let Some(bossbar) = bossbar {
                self.bossbar = Some(bossbar);
            }
            self.slots.push(ShowcaseSlot::new(kind, sc.clone(), built));
        }

        self.expire_at += Duration::seconds(2);
        debug!(timer = %self.id, target = %target, "Rebuilt timer for new target");
    }

    fn fire_due_actions(&mut self, now: DateTime<Utc>) {
        for scheduled in &mut self.scheduled {
            if scheduled.fired || now < scheduled.at {
                continue;
            }
            scheduled.fired = true;

            let rc = Arc::clone(&self.rc);
            let action = Arc::clone(&scheduled.action);
            let timer_id = self.id.clone();
            tokio::spawn(async move {
                debug!(timer = %timer_id, action = action.name(), "Executing action");
                action.execute(&rc).await;
            });
        }
    }

    async fn update_showcases(&mut self, now: DateTime<Utc>) {
        let Some(target) = self.next_target else {
            return;
        };
        let target_utc = target.with_timezone(&Utc);
        let now_ms = now.timestamp_millis();
        let rc = Arc::clone(&self.rc);

        for slot in &mut self.slots {
            if !should_show(target_utc, slot.kind(), slot.config(), now) {
                continue;
            }
            let interval_ms = slot.interval_ms();
            if !slot.try_acquire(now_ms, interval_ms) {
                continue;
            }
            slot.showcase().show(&rc).await;
        }
    }

    /// Refreshes the boss bar for a player that joined or switched servers.
    pub async fn refresh_for(&self, player: &Player) {
        let Some(bossbar) = &self.bossbar else {
            return;
        };
        let Some(target) = self.next_target else {
            return;
        };
        let Some(slot) = self.slots.iter().find(|s| s.kind() == ShowcaseKind::Bossbar) else {
            return;
        };

        let now = self.shared.read().now;
        let visible = should_show(target.with_timezone(&Utc), slot.kind(), slot.config(), now)
            && self.rc.allowed(player);
        if visible {
            bossbar.show_to(player, &self.rc).await;
        } else {
            bossbar.hide_from(player, &self.rc).await;
        }
    }

    /// Drops the boss bar for a disconnecting player.
    pub async fn hide_for(&self, player: &Player) {
        if let Some(bossbar) = &self.bossbar {
            bossbar.hide_from(player, &self.rc).await;
        }
    }

    /// Tears the instance down, hiding any boss bars it owns.
    pub async fn dispose(&self) {
        if let Some(bossbar) = &self.bossbar {
            for player in self.rc.players().await {
                bossbar.hide_from(&player, &self.rc).await;
            }
        }
    }
}

fn parse_schedule(config: &TimerConfig) -> Schedule {
    if let Some(expr) = config.cron.as_deref().filter(|s| !s.trim().is_empty())
        && let Ok(cron) = Cron::parse(expr)
    {
        return Schedule::Cron(cron);
    }
    if let Some(time) = config.time.as_deref().filter(|s| !s.trim().is_empty())
        && let Ok(naive) = NaiveDateTime::parse_from_str(time, ONE_SHOT_TIME_FORMAT)
    {
        return Schedule::Once(naive);
    }
    Schedule::Unscheduled
}

fn allowed_fn(
    global: LimitationConfig,
    timer: Option<LimitationConfig>,
) -> Arc<dyn Fn(&Player) -> bool + Send + Sync> {
    Arc::new(move |player| {
        let server = player.server.as_deref();
        if !global.is_allowed(server) {
            return false;
        }
        timer.as_ref().is_none_or(|t| t.is_allowed(server))
    })
}

fn eval_supplier(
    id: String,
    description: String,
    shared: Arc<RwLock<TargetState>>,
) -> Arc<dyn Fn() -> EvalContext + Send + Sync> {
    Arc::new(move || {
        let state = shared.read();
        let mut ctx = EvalContext::new(id.clone(), description.clone(), state.now);
        if let Some(target) = state.target {
            ctx = ctx.with_target(target, state.target_text.clone());
        }
        ctx
    })
}

fn text_supplier(shared: &Arc<RwLock<TargetState>>, sc: &ShowcaseConfig) -> TextSupplier {
    let shared = Arc::clone(shared);
    let text = sc.text.clone();
    let after = sc.after.clone();
    Arc::new(move || {
        let state = shared.read();
        let (Some(target), Some(after)) = (state.target, &after) else {
            return text.clone();
        };
        let Some(window) = after.window() else {
            return text.clone();
        };
        let target_utc = target.with_timezone(&Utc);
        if state.now >= target_utc && state.now <= target_utc + window {
            after.text.clone()
        } else {
            text.clone()
        }
    })
}

fn progress_supplier(shared: &Arc<RwLock<TargetState>>, sc: &ShowcaseConfig) -> ProgressSupplier {
    let shared = Arc::clone(shared);
    let start_at = sc.start_at_duration();
    Arc::new(move || {
        let state = shared.read();
        let Some(target) = state.target else {
            return 1.0;
        };
        let remaining = (target.with_timezone(&Utc) - state.now).num_seconds().max(0);

        match start_at {
            Some(window) if !window.is_zero() => {
                let total = window.abs().num_seconds();
                if total == 0 {
                    0.0
                } else {
                    (remaining as f32 / total as f32).clamp(0.0, 1.0)
                }
            }
            _ => {
                if remaining > 0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    })
}

/// Whether a showcase is inside its display window at `now`.
fn should_show(
    target_utc: DateTime<Utc>,
    kind: ShowcaseKind,
    config: &ShowcaseConfig,
    now: DateTime<Utc>,
) -> bool {
    let begin = match config.start_at_duration() {
        Some(d) => target_utc - d.abs(),
        None => DateTime::UNIX_EPOCH,
    };

    let mut end = target_utc;
    if kind.allows_after()
        && let Some(after) = &config.after
        && let Some(window) = after.window()
    {
        end = target_utc + window;
    }

    now >= begin && now <= end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DowncountConfig;
    use crate::host::testing::{HostCall, RecordingHost};
    use downcount_core::{Catalog, MissPolicy, Settings};
    use std::collections::BTreeMap;

    fn engine() -> Engine {
        let settings = Settings::new(
            BTreeMap::new(),
            BTreeMap::new(),
            BTreeMap::new(),
            MissPolicy::Token,
        );
        Engine::new(Arc::new(settings), Arc::new(Catalog::builtin_en_us()))
    }

    fn instance_from_yaml(yaml: &str, id: &str, host: Arc<RecordingHost>) -> TimerInstance {
        let config = DowncountConfig::from_yaml_str(yaml).unwrap();
        let timer = config.timers[id].clone();
        TimerInstance::new(id.to_string(), timer, &config.global, engine(), host)
    }

    fn one_shot_yaml(id: &str, target: DateTime<Utc>, extra: &str) -> String {
        format!(
            "timers:\n  {id}:\n    time: \"{}\"\n{extra}",
            target.format(ONE_SHOT_TIME_FORMAT)
        )
    }

    #[tokio::test]
    async fn test_past_one_shot_has_no_target() {
        let host = Arc::new(RecordingHost::with_players(vec![]));
        let target = Utc::now() - Duration::hours(1);
        let mut instance = instance_from_yaml(&one_shot_yaml("t", target, ""), "t", host);

        instance.tick(Utc::now()).await;
        assert_eq!(instance.peek_next(), None);
    }

    #[tokio::test]
    async fn test_cron_target_matches_cron_next() {
        let host = Arc::new(RecordingHost::with_players(vec![]));
        let yaml = "timers:\n  t:\n    cron: \"0 4 * * *\"\n";
        let mut instance = instance_from_yaml(yaml, "t", host);

        let now = Utc::now();
        instance.tick(now).await;

        let cron = Cron::parse("0 4 * * *").unwrap();
        let zoned = now.with_timezone(&Utc.fix());
        let zoned = zoned.with_second(0).unwrap().with_nanosecond(0).unwrap();
        let expected = cron.next_after(zoned).unwrap();
        assert_eq!(instance.peek_next(), Some(expected.to_rfc3339()));
    }

    #[tokio::test]
    async fn test_action_fires_once_after_target() {
        let host = Arc::new(RecordingHost::with_players(vec![]));
        let target = Utc::now() + Duration::minutes(2);
        let yaml = one_shot_yaml(
            "t",
            target,
            "    actions:\n      - type: command\n        executor: console\n        command: \"say go\"\n",
        );
        let mut instance = instance_from_yaml(&yaml, "t", host.clone());

        instance.tick(Utc::now()).await;
        assert!(host.calls().is_empty());

        // past the target but before expiry
        instance.tick(target + Duration::seconds(1)).await;
        instance.tick(target + Duration::seconds(1)).await;
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert_eq!(
            host.calls(),
            vec![HostCall::ConsoleCommand {
                command: "say go".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_showcase_respects_window_and_interval() {
        let host = Arc::new(RecordingHost::with_players(vec![Player::new("Ari")]));
        let target = Utc::now() + Duration::hours(2);
        let yaml = one_shot_yaml(
            "t",
            target,
            "    showcases:\n      actionbar:\n        text: \"{remaining}\"\n        start-at: 1h\n",
        );
        let mut instance = instance_from_yaml(&yaml, "t", host.clone());

        // outside the 1h window: nothing shows
        instance.tick(Utc::now()).await;
        assert!(host.calls().is_empty());

        // inside the window: shows once, then throttles for 1s
        let inside = target - Duration::minutes(30);
        instance.tick(inside).await;
        instance.tick(inside + Duration::milliseconds(250)).await;
        assert_eq!(host.calls().len(), 1);

        instance.tick(inside + Duration::seconds(1)).await;
        assert_eq!(host.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_bossbar_refresh_and_dispose() {
        let player = Player::new("Ari");
        let host = Arc::new(RecordingHost::with_players(vec![player.clone()]));
        let target = Utc::now() + Duration::minutes(30);
        let yaml = one_shot_yaml(
            "t",
            target,
            "    showcases:\n      bossbar:\n        text: \"{remaining}\"\n        start-at: 1h\n        color: red\n",
        );
        let mut instance = instance_from_yaml(&yaml, "t", host.clone());
        instance.tick(Utc::now()).await;

        host.calls.lock().clear();
        instance.refresh_for(&player).await;
        assert!(matches!(host.calls()[0], HostCall::Bossbar { .. }));

        host.calls.lock().clear();
        instance.dispose().await;
        assert_eq!(
            host.calls(),
            vec![HostCall::HideBossbar {
                player: "Ari".to_string(),
                key: "t".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_limitation_filters_players() {
        let yaml = "\
global:
  limitation:
    mode: whitelist
    list: [survival]
timers:
  t:
    time: \"2030-01-01 00:00:00\"
    showcases:
      text:
        text: soon
";
        let host = Arc::new(RecordingHost::with_players(vec![
            Player::new("in").on_server("survival"),
            Player::new("out").on_server("lobby"),
        ]));
        let config = DowncountConfig::from_yaml_str(yaml).unwrap();
        let timer = config.timers["t"].clone();
        let mut instance =
            TimerInstance::new("t".to_string(), timer, &config.global, engine(), host.clone());

        instance.tick(Utc::now()).await;
        let calls = host.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(
            &calls[0],
            HostCall::Message { player, .. } if player == "in"
        ));
    }
}
