//! Need Components
//!
//! A `Need` is a single decaying/recoverable scalar (health, hunger, sanity,
//! fuel) with a low-state threshold and edge-triggered transitions. A
//! `NeedSet` owns an actor's needs, runs their passive decay, and manages the
//! hunger/sanity-to-health bleed couplings.
//!
//! Edge transitions are returned as data from every mutation (and buffered
//! for the tick loop to drain) instead of being dispatched through callbacks,
//! so ordering stays deterministic and a handler can never re-enter the tick.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use companion_events::CompanionSnapshot;

use crate::config::NeedsConfig;

/// Values within this distance of zero count as depleted.
pub const DEPLETION_EPSILON: f32 = 0.001;

/// Which resource a need tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeedKind {
    Health,
    Hunger,
    Sanity,
    Fuel,
}

impl NeedKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Hunger => "hunger",
            Self::Sanity => "sanity",
            Self::Fuel => "fuel",
        }
    }
}

/// Edge and value transitions a single mutation can produce.
///
/// Low-state entry/exit are hysteresis-latched: hovering below the threshold
/// produces exactly one `EnteringLowState` per continuous excursion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NeedEvent {
    EnteringLowState,
    ExitingLowState,
    Depleting,
    Recovering,
    ValueIncreased(f32),
    ValueDecreased(f32),
}

/// What a single mutation did.
#[derive(Debug, Clone, Default)]
pub struct NeedOutcome {
    /// Whether the stored value actually changed (false when the mutation
    /// was a no-op against a bound).
    pub changed: bool,
    pub events: Vec<NeedEvent>,
}

/// A single decaying/recoverable resource.
///
/// Invariant: `0 <= current <= max` after every mutation.
#[derive(Debug, Clone)]
pub struct Need {
    kind: NeedKind,
    current: f32,
    max: f32,
    low_threshold: f32,
    is_low_state: bool,
    is_depleted: bool,
    has_fired_low_state_enter: bool,
}

impl Need {
    /// Creates a need filled to `max`.
    ///
    /// Panics if `low_threshold > max` — that is a construction bug, not a
    /// runtime condition.
    pub fn new(kind: NeedKind, max: f32, low_threshold: f32) -> Self {
        assert!(
            low_threshold <= max,
            "need {} constructed with low_threshold {} > max {}",
            kind.label(),
            low_threshold,
            max
        );
        Self {
            kind,
            current: max,
            max,
            low_threshold,
            is_low_state: false,
            is_depleted: false,
            has_fired_low_state_enter: false,
        }
    }

    pub fn kind(&self) -> NeedKind {
        self.kind
    }

    pub fn value(&self) -> f32 {
        self.current
    }

    pub fn max_value(&self) -> f32 {
        self.max
    }

    pub fn is_low_state(&self) -> bool {
        self.is_low_state
    }

    pub fn is_depleted(&self) -> bool {
        self.is_depleted
    }

    pub fn is_full(&self) -> bool {
        (self.current - self.max).abs() <= f32::EPSILON
    }

    /// Applies `delta` with the depletion sign convention: positive delta
    /// drains the need, negative delta restores it.
    ///
    /// Value events fire from the sign of the delta before clamping; edge
    /// events are re-evaluated after clamping. `outcome.changed` reports
    /// whether the stored value moved at all.
    pub fn modify_value(&mut self, delta: f32) -> NeedOutcome {
        let mut outcome = NeedOutcome::default();

        if delta > 0.0 {
            outcome.events.push(NeedEvent::ValueDecreased(delta));
        } else if delta < 0.0 {
            outcome.events.push(NeedEvent::ValueIncreased(-delta));
        }

        let modified = (self.current - delta).clamp(0.0, self.max);
        outcome.changed = (self.current - modified).abs() > f32::EPSILON;
        self.current = modified;

        self.check_edges(&mut outcome);
        outcome
    }

    /// Direct set, used by save/load and debug hooks. Clamped; fires
    /// `ValueIncreased` when the new value exceeds the old.
    pub fn set_value(&mut self, val: f32) -> NeedOutcome {
        let mut outcome = NeedOutcome::default();

        if val > self.current {
            outcome.events.push(NeedEvent::ValueIncreased(val - self.current));
        }

        let clamped = val.clamp(0.0, self.max);
        outcome.changed = (self.current - clamped).abs() > f32::EPSILON;
        self.current = clamped;

        self.check_edges(&mut outcome);
        outcome
    }

    /// Upgrade hook: grow the pool, optionally refilling to the new max.
    pub fn increase_max_value(&mut self, delta: f32, refill: bool) -> NeedOutcome {
        self.max += delta;
        let mut outcome = NeedOutcome::default();
        if refill {
            outcome = self.set_value(self.max);
        } else {
            self.current = self.current.clamp(0.0, self.max);
            self.check_edges(&mut outcome);
        }
        outcome
    }

    /// Upgrade hook: replace the pool size outright.
    pub fn set_max_value(&mut self, val: f32, refill: bool) -> NeedOutcome {
        self.max = val;
        let mut outcome = NeedOutcome::default();
        if refill {
            outcome = self.set_value(self.max);
        } else {
            self.current = self.current.clamp(0.0, self.max);
            self.check_edges(&mut outcome);
        }
        outcome
    }

    fn check_edges(&mut self, outcome: &mut NeedOutcome) {
        if self.current < self.low_threshold {
            self.is_low_state = true;
            if !self.has_fired_low_state_enter {
                outcome.events.push(NeedEvent::EnteringLowState);
                self.has_fired_low_state_enter = true;
            }
        } else {
            if self.is_low_state {
                outcome.events.push(NeedEvent::ExitingLowState);
                self.has_fired_low_state_enter = false;
            }
            self.is_low_state = false;
        }

        if self.current.abs() <= DEPLETION_EPSILON {
            if !self.is_depleted {
                outcome.events.push(NeedEvent::Depleting);
            }
            self.is_depleted = true;
        } else {
            if self.is_depleted {
                outcome.events.push(NeedEvent::Recovering);
            }
            self.is_depleted = false;
        }
    }
}

/// Decay and coupling rates, lifted from config once at spawn.
#[derive(Debug, Clone)]
pub struct DecayParams {
    pub hunger_per_sec: f32,
    pub sanity_per_sec: f32,
    pub health_bleed_when_hungry: f32,
    pub health_bleed_when_insane: f32,
    /// Seconds between decay applications
    pub interval: f32,
}

impl From<&NeedsConfig> for DecayParams {
    fn from(cfg: &NeedsConfig) -> Self {
        Self {
            hunger_per_sec: cfg.hunger_decay_per_sec,
            sanity_per_sec: cfg.sanity_decay_per_sec,
            health_bleed_when_hungry: cfg.health_bleed_when_hungry,
            health_bleed_when_insane: cfg.health_bleed_when_insane,
            interval: cfg.decay_interval,
        }
    }
}

/// A resumable fixed-interval activity, owned by a single handle.
///
/// Starting a new one replaces (cancels) any previous one; dropping the
/// handle cancels it. The accumulator only advances while the owner ticks
/// it, so pausing produces zero drift rather than a catch-up burst.
#[derive(Debug, Clone, Default)]
struct IntervalTask {
    accumulated: f32,
}

impl IntervalTask {
    fn new() -> Self {
        Self::default()
    }

    /// Advances by `dt` and returns how many whole intervals elapsed.
    fn advance(&mut self, dt: f32, interval: f32) -> u32 {
        self.accumulated += dt;
        let mut fires = 0;
        while self.accumulated >= interval {
            self.accumulated -= interval;
            fires += 1;
        }
        fires
    }
}

/// An actor's needs plus their decay/coupling state.
#[derive(Component, Debug, Clone)]
pub struct NeedSet {
    health: Option<Need>,
    hunger: Option<Need>,
    sanity: Option<Need>,
    fuel: Option<Need>,

    paused: bool,
    params: DecayParams,

    hunger_decay: Option<IntervalTask>,
    sanity_decay: Option<IntervalTask>,
    // Coupling handles: live exactly while the dependent need is low.
    hunger_bleed: Option<IntervalTask>,
    sanity_bleed: Option<IntervalTask>,

    pending: Vec<(NeedKind, NeedEvent)>,
}

impl NeedSet {
    pub fn new(needs: Vec<Need>, params: DecayParams) -> Self {
        let mut set = Self {
            health: None,
            hunger: None,
            sanity: None,
            fuel: None,
            paused: false,
            params,
            hunger_decay: None,
            sanity_decay: None,
            hunger_bleed: None,
            sanity_bleed: None,
            pending: Vec::new(),
        };
        for need in needs {
            match need.kind() {
                NeedKind::Health => set.health = Some(need),
                NeedKind::Hunger => set.hunger = Some(need),
                NeedKind::Sanity => set.sanity = Some(need),
                NeedKind::Fuel => set.fuel = Some(need),
            }
        }
        // Passive decay only runs for needs that can bleed into health.
        if set.health.is_some() && set.hunger.is_some() {
            set.hunger_decay = Some(IntervalTask::new());
        }
        if set.health.is_some() && set.sanity.is_some() {
            set.sanity_decay = Some(IntervalTask::new());
        }
        set
    }

    /// The companion's set: health, hunger, sanity.
    pub fn companion(cfg: &NeedsConfig) -> Self {
        Self::new(
            vec![
                Need::new(NeedKind::Health, cfg.health_max, cfg.health_low_threshold),
                Need::new(NeedKind::Hunger, cfg.hunger_max, cfg.hunger_low_threshold),
                Need::new(NeedKind::Sanity, cfg.sanity_max, cfg.sanity_low_threshold),
            ],
            DecayParams::from(cfg),
        )
    }

    /// The player's set: fuel only.
    pub fn player(cfg: &NeedsConfig) -> Self {
        Self::new(
            vec![Need::new(NeedKind::Fuel, cfg.fuel_max, cfg.fuel_low_threshold)],
            DecayParams::from(cfg),
        )
    }

    pub fn get(&self, kind: NeedKind) -> Option<&Need> {
        match kind {
            NeedKind::Health => self.health.as_ref(),
            NeedKind::Hunger => self.hunger.as_ref(),
            NeedKind::Sanity => self.sanity.as_ref(),
            NeedKind::Fuel => self.fuel.as_ref(),
        }
    }

    /// External pause of decay (dialogue, cutscenes). A plain boolean, not a
    /// refcount: one `set_paused(false)` resumes regardless of how many
    /// pauses preceded it.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Mutation chokepoint: applies the delta, keeps the bleed couplings in
    /// sync with any low-state edges it produced, and buffers the edges for
    /// the tick loop. Returns whether the value actually changed, or `None`
    /// for a need this actor does not have.
    pub fn modify_value(&mut self, kind: NeedKind, delta: f32) -> Option<bool> {
        let outcome = self.need_mut(kind)?.modify_value(delta);
        Some(self.absorb(kind, outcome))
    }

    /// Direct set, clamped; same bookkeeping as [`Self::modify_value`].
    pub fn set_value(&mut self, kind: NeedKind, val: f32) -> Option<bool> {
        let outcome = self.need_mut(kind)?.set_value(val);
        Some(self.absorb(kind, outcome))
    }

    pub fn increase_max_value(&mut self, kind: NeedKind, delta: f32, refill: bool) -> Option<bool> {
        let outcome = self.need_mut(kind)?.increase_max_value(delta, refill);
        Some(self.absorb(kind, outcome))
    }

    pub fn set_max_value(&mut self, kind: NeedKind, val: f32, refill: bool) -> Option<bool> {
        let outcome = self.need_mut(kind)?.set_max_value(val, refill);
        Some(self.absorb(kind, outcome))
    }

    /// Advances passive decay and the bleed couplings by `dt`. Skipped
    /// entirely while paused: nothing accumulates, so resuming never
    /// produces a burst.
    pub fn tick(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        let interval = self.params.interval;

        let fires = advance(&mut self.hunger_decay, dt, interval);
        if fires > 0 {
            let amount = self.params.hunger_per_sec * interval * fires as f32;
            self.modify_value(NeedKind::Hunger, amount);
        }

        let fires = advance(&mut self.sanity_decay, dt, interval);
        if fires > 0 {
            let amount = self.params.sanity_per_sec * interval * fires as f32;
            self.modify_value(NeedKind::Sanity, amount);
        }

        let fires = advance(&mut self.hunger_bleed, dt, interval);
        if fires > 0 {
            let amount = self.params.health_bleed_when_hungry * interval * fires as f32;
            self.modify_value(NeedKind::Health, amount);
        }

        let fires = advance(&mut self.sanity_bleed, dt, interval);
        if fires > 0 {
            let amount = self.params.health_bleed_when_insane * interval * fires as f32;
            self.modify_value(NeedKind::Health, amount);
        }
    }

    /// Takes the edges buffered since the last drain. The tick loop calls
    /// this once per frame; handlers react to the data instead of being
    /// called back mid-mutation.
    pub fn drain_events(&mut self) -> Vec<(NeedKind, NeedEvent)> {
        std::mem::take(&mut self.pending)
    }

    /// Whether a bleed coupling is currently running for the given source
    /// need (hunger or sanity).
    pub fn has_active_coupling(&self, kind: NeedKind) -> bool {
        match kind {
            NeedKind::Hunger => self.hunger_bleed.is_some(),
            NeedKind::Sanity => self.sanity_bleed.is_some(),
            _ => false,
        }
    }

    /// Captures the companion save slice. `None` when this set is not a
    /// companion set.
    pub fn capture_snapshot(&self) -> Option<CompanionSnapshot> {
        Some(CompanionSnapshot::new(
            self.health.as_ref()?.value(),
            self.hunger.as_ref()?.value(),
            self.sanity.as_ref()?.value(),
        ))
    }

    /// Restores the companion save slice.
    pub fn apply_snapshot(&mut self, snapshot: &CompanionSnapshot) {
        self.set_value(NeedKind::Health, snapshot.health);
        self.set_value(NeedKind::Hunger, snapshot.hunger);
        self.set_value(NeedKind::Sanity, snapshot.sanity);
    }

    fn need_mut(&mut self, kind: NeedKind) -> Option<&mut Need> {
        match kind {
            NeedKind::Health => self.health.as_mut(),
            NeedKind::Hunger => self.hunger.as_mut(),
            NeedKind::Sanity => self.sanity.as_mut(),
            NeedKind::Fuel => self.fuel.as_mut(),
        }
    }

    fn absorb(&mut self, kind: NeedKind, outcome: NeedOutcome) -> bool {
        for event in &outcome.events {
            match (kind, event) {
                // A fresh coupling task on every low-state entry: re-entering
                // low state never reuses a stale handle.
                (NeedKind::Hunger, NeedEvent::EnteringLowState) => {
                    self.hunger_bleed = Some(IntervalTask::new());
                }
                (NeedKind::Hunger, NeedEvent::ExitingLowState) => {
                    self.hunger_bleed = None;
                }
                (NeedKind::Sanity, NeedEvent::EnteringLowState) => {
                    self.sanity_bleed = Some(IntervalTask::new());
                }
                (NeedKind::Sanity, NeedEvent::ExitingLowState) => {
                    self.sanity_bleed = None;
                }
                _ => {}
            }
        }
        self.pending
            .extend(outcome.events.iter().map(|&e| (kind, e)));
        outcome.changed
    }
}

fn advance(task: &mut Option<IntervalTask>, dt: f32, interval: f32) -> u32 {
    task.as_mut().map_or(0, |t| t.advance(dt, interval))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_events(set: &mut NeedSet) -> Vec<(NeedKind, NeedEvent)> {
        set.drain_events()
            .into_iter()
            .filter(|(_, e)| {
                !matches!(
                    e,
                    NeedEvent::ValueIncreased(_) | NeedEvent::ValueDecreased(_)
                )
            })
            .collect()
    }

    #[test]
    fn test_clamping_holds_under_any_sequence() {
        let mut need = Need::new(NeedKind::Health, 100.0, 30.0);
        for delta in [250.0, -10.0, -500.0, 37.5, 1000.0, -0.1] {
            need.modify_value(delta);
            assert!(need.value() >= 0.0 && need.value() <= need.max_value());
        }
        need.set_value(-50.0);
        assert_eq!(need.value(), 0.0);
        need.set_value(9999.0);
        assert_eq!(need.value(), 100.0);
    }

    #[test]
    fn test_modify_reports_whether_value_changed() {
        let mut need = Need::new(NeedKind::Hunger, 100.0, 30.0);
        // Already at max: restoring is a no-op.
        assert!(!need.modify_value(-5.0).changed);
        assert!(need.modify_value(5.0).changed);
        need.set_value(0.0);
        // Already at zero: draining is a no-op.
        assert!(!need.modify_value(5.0).changed);
    }

    #[test]
    fn test_value_events_follow_delta_sign() {
        let mut need = Need::new(NeedKind::Hunger, 100.0, 30.0);
        let outcome = need.modify_value(10.0);
        assert!(outcome
            .events
            .contains(&NeedEvent::ValueDecreased(10.0)));
        let outcome = need.modify_value(-4.0);
        assert!(outcome.events.contains(&NeedEvent::ValueIncreased(4.0)));
        // Zero delta produces no value events.
        assert!(need.modify_value(0.0).events.is_empty());
    }

    #[test]
    fn test_low_state_hysteresis() {
        let mut need = Need::new(NeedKind::Health, 100.0, 30.0);

        // 100 -> 25 fires exactly one entering edge.
        let outcome = need.modify_value(75.0);
        let enters = outcome
            .events
            .iter()
            .filter(|e| matches!(e, NeedEvent::EnteringLowState))
            .count();
        assert_eq!(enters, 1);
        assert!(need.is_low_state());

        // Oscillating 25 <-> 29 fires no further low-state edges.
        for _ in 0..5 {
            for e in need.modify_value(-4.0).events {
                assert!(matches!(e, NeedEvent::ValueIncreased(_)));
            }
            for e in need.modify_value(4.0).events {
                assert!(matches!(e, NeedEvent::ValueDecreased(_)));
            }
        }

        // Crossing back above the threshold fires exactly one exit edge.
        let outcome = need.modify_value(-10.0);
        let exits = outcome
            .events
            .iter()
            .filter(|e| matches!(e, NeedEvent::ExitingLowState))
            .count();
        assert_eq!(exits, 1);
        assert!(!need.is_low_state());

        // Re-entry latches again.
        let outcome = need.modify_value(20.0);
        assert!(outcome.events.contains(&NeedEvent::EnteringLowState));
    }

    #[test]
    fn test_depletion_edges_fire_once() {
        let mut need = Need::new(NeedKind::Sanity, 100.0, 30.0);
        let outcome = need.modify_value(100.0);
        assert!(outcome.events.contains(&NeedEvent::Depleting));
        assert!(need.is_depleted());

        // Sitting at zero fires nothing more.
        for _ in 0..3 {
            let outcome = need.modify_value(0.0);
            assert!(!outcome.events.contains(&NeedEvent::Depleting));
        }
        let outcome = need.modify_value(10.0);
        assert!(!outcome.events.contains(&NeedEvent::Depleting));

        let outcome = need.modify_value(-1.0);
        assert!(outcome.events.contains(&NeedEvent::Recovering));
        assert!(!need.is_depleted());
    }

    #[test]
    #[should_panic]
    fn test_bad_threshold_is_a_construction_bug() {
        Need::new(NeedKind::Health, 50.0, 80.0);
    }

    #[test]
    fn test_set_max_value_refills() {
        let mut need = Need::new(NeedKind::Health, 100.0, 30.0);
        need.modify_value(60.0);
        need.set_max_value(150.0, true);
        assert_eq!(need.value(), 150.0);

        let mut need = Need::new(NeedKind::Health, 100.0, 30.0);
        need.modify_value(60.0);
        need.increase_max_value(50.0, false);
        assert_eq!(need.value(), 40.0);
        assert_eq!(need.max_value(), 150.0);
    }

    #[test]
    fn test_passive_decay_rates() {
        let cfg = NeedsConfig::default();
        let mut set = NeedSet::companion(&cfg);
        // Ten seconds of ticking at 0.1s per tick.
        for _ in 0..100 {
            set.tick(0.1);
        }
        let hunger = set.get(NeedKind::Hunger).unwrap();
        let expected = cfg.hunger_max - cfg.hunger_decay_per_sec * 10.0;
        assert!((hunger.value() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_pause_produces_zero_drift() {
        let cfg = NeedsConfig::default();
        let mut set = NeedSet::companion(&cfg);
        set.set_paused(true);
        for _ in 0..100 {
            set.tick(0.1);
        }
        assert_eq!(set.get(NeedKind::Hunger).unwrap().value(), cfg.hunger_max);

        // Resuming does not apply the skipped time as a burst.
        set.set_paused(false);
        set.tick(0.1);
        let hunger = set.get(NeedKind::Hunger).unwrap().value();
        assert!(cfg.hunger_max - hunger < cfg.hunger_decay_per_sec * cfg.decay_interval + 1e-3);
    }

    #[test]
    fn test_pause_is_plain_boolean_not_refcounted() {
        let cfg = NeedsConfig::default();
        let mut set = NeedSet::companion(&cfg);
        set.set_paused(true);
        set.set_paused(true);
        set.set_paused(false);
        assert!(!set.is_paused());
    }

    #[test]
    fn test_hunger_coupling_starts_and_stops_with_low_state() {
        let cfg = NeedsConfig::default();
        let mut set = NeedSet::companion(&cfg);

        set.modify_value(NeedKind::Hunger, 80.0); // 20 < 30: low
        assert!(set.has_active_coupling(NeedKind::Hunger));

        // Health bleeds while the coupling runs.
        let before = set.get(NeedKind::Health).unwrap().value();
        for _ in 0..30 {
            set.tick(0.1);
        }
        let after = set.get(NeedKind::Health).unwrap().value();
        assert!(after < before);

        // Exiting low state cancels the coupling exactly once.
        set.modify_value(NeedKind::Hunger, -80.0);
        assert!(!set.has_active_coupling(NeedKind::Hunger));

        // Re-entering starts a fresh task, not a stale handle.
        set.modify_value(NeedKind::Hunger, -100.0);
        set.modify_value(NeedKind::Hunger, 85.0);
        assert!(set.has_active_coupling(NeedKind::Hunger));
    }

    #[test]
    fn test_drained_events_are_tagged_by_kind() {
        let cfg = NeedsConfig::default();
        let mut set = NeedSet::companion(&cfg);
        set.modify_value(NeedKind::Sanity, 75.0);
        let edges = edge_events(&mut set);
        assert_eq!(
            edges,
            vec![(NeedKind::Sanity, NeedEvent::EnteringLowState)]
        );
        // Drain empties the buffer.
        assert!(set.drain_events().is_empty());
    }

    #[test]
    fn test_snapshot_roundtrip_through_needset() {
        let cfg = NeedsConfig::default();
        let mut set = NeedSet::companion(&cfg);
        set.modify_value(NeedKind::Health, 40.0);
        set.modify_value(NeedKind::Hunger, 10.0);

        let snapshot = set.capture_snapshot().unwrap();
        let mut restored = NeedSet::companion(&cfg);
        restored.apply_snapshot(&snapshot);

        assert_eq!(restored.get(NeedKind::Health).unwrap().value(), 60.0);
        assert_eq!(restored.get(NeedKind::Hunger).unwrap().value(), 90.0);
        assert_eq!(restored.get(NeedKind::Sanity).unwrap().value(), 100.0);
    }

    #[test]
    fn test_player_set_has_fuel_only() {
        let cfg = NeedsConfig::default();
        let set = NeedSet::player(&cfg);
        assert!(set.get(NeedKind::Fuel).is_some());
        assert!(set.get(NeedKind::Health).is_none());
        assert!(set.capture_snapshot().is_none());
    }
}
