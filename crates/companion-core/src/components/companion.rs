//! Companion Controller Components
//!
//! The companion's behavioral mode (`CompanionTask`), the guard table that
//! decides which mode changes are allowed, and the `Companion` component that
//! carries the controller state between ticks.

use bevy_ecs::prelude::*;
use glam::Vec3;

use companion_events::{bark_scenarios, EventKind};

use crate::components::needs::{NeedKind, NeedSet};
use crate::config::AiConfig;
use crate::events::TickEvents;

/// The companion's current behavioral mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompanionTask {
    #[default]
    Idle,
    IdleAtSpawn,
    FindingResource,
    MovingToResource,
    GatheringResource,
    Feed,
    InDialogue,
    ProcessFuel,
    /// Deprecated head-pat interaction. Still named by the guard table but
    /// never committed; committing it is a programming error.
    Pat,
    MovingToPlace,
    Follow,
    BeingAttacked,
    MovingToShelter,
    InShelter,
}

impl CompanionTask {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::IdleAtSpawn => "idle_at_spawn",
            Self::FindingResource => "finding_resource",
            Self::MovingToResource => "moving_to_resource",
            Self::GatheringResource => "gathering_resource",
            Self::Feed => "feed",
            Self::InDialogue => "in_dialogue",
            Self::ProcessFuel => "process_fuel",
            Self::Pat => "pat",
            Self::MovingToPlace => "moving_to_place",
            Self::Follow => "follow",
            Self::BeingAttacked => "being_attacked",
            Self::MovingToShelter => "moving_to_shelter",
            Self::InShelter => "in_shelter",
        }
    }

    /// Tasks that serialize the companion for a player interaction.
    pub fn is_interaction(self) -> bool {
        matches!(self, Self::Feed | Self::InDialogue | Self::ProcessFuel | Self::Pat)
    }

    pub fn is_gathering(self) -> bool {
        matches!(
            self,
            Self::FindingResource | Self::MovingToResource | Self::GatheringResource
        )
    }

    /// Tasks worth coming back to after an interruption resolves.
    fn records_previous(self) -> bool {
        matches!(
            self,
            Self::FindingResource
                | Self::MovingToResource
                | Self::GatheringResource
                | Self::Idle
                | Self::IdleAtSpawn
                | Self::Follow
                | Self::MovingToPlace
        )
    }
}

/// The transition-guard table: may `requested` replace `current`?
///
/// Combat rejects interaction and gathering requests outright; gathering is
/// not interruptible by passive social triggers; a running interaction
/// serializes further interaction requests. Everything else is allowed.
/// Kept as a pure function so the policy is testable apart from execution.
pub fn transition_allowed(
    current: CompanionTask,
    requested: CompanionTask,
    is_being_interacted: bool,
) -> bool {
    use CompanionTask::*;
    match current {
        BeingAttacked => !matches!(requested, InDialogue | FindingResource | Pat | ProcessFuel),
        FindingResource | MovingToResource | GatheringResource => {
            !matches!(requested, InDialogue | Pat)
        }
        Feed | Pat | InDialogue | ProcessFuel => !is_being_interacted,
        _ => true,
    }
}

/// Low-state flags for the companion's needs, in auto-consume priority order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LowNeedFlags(u8);

impl LowNeedFlags {
    fn bit(kind: NeedKind) -> u8 {
        match kind {
            NeedKind::Health => 1,
            NeedKind::Hunger => 2,
            NeedKind::Sanity => 4,
            NeedKind::Fuel => 0,
        }
    }

    pub fn insert(&mut self, kind: NeedKind) {
        self.0 |= Self::bit(kind);
    }

    pub fn remove(&mut self, kind: NeedKind) {
        self.0 &= !Self::bit(kind);
    }

    pub fn contains(&self, kind: NeedKind) -> bool {
        let bit = Self::bit(kind);
        bit != 0 && (self.0 & bit) != 0
    }

    pub fn any(&self) -> bool {
        self.0 != 0
    }

    /// The single need auto-consume services this tick: health first, then
    /// hunger, then sanity.
    pub fn highest_priority(&self) -> Option<NeedKind> {
        if self.contains(NeedKind::Health) {
            Some(NeedKind::Health)
        } else if self.contains(NeedKind::Hunger) {
            Some(NeedKind::Hunger)
        } else if self.contains(NeedKind::Sanity) {
            Some(NeedKind::Sanity)
        } else {
            None
        }
    }
}

/// The idle-wander activity. Owned by a single handle on the companion;
/// committing any task drops it, and a fresh one starts from zero.
#[derive(Debug, Clone)]
pub struct WanderActivity {
    pub wait_remaining: f32,
}

/// Push-back displacement from a hit, resumed across ticks until it expires.
#[derive(Debug, Clone)]
pub struct PushBack {
    pub direction: Vec3,
    pub remaining: f32,
}

/// Controller state for the companion. One per companion entity, created at
/// spawn and mutated only through the guarded entry points below.
#[derive(Component, Debug)]
pub struct Companion {
    pub current_task: CompanionTask,
    pub previous_task: CompanionTask,
    pub destination: Vec3,
    pub saved_destination: Vec3,
    pub is_being_interacted: bool,
    pub is_being_attacked: bool,
    pub is_dying: bool,
    pub resource_target: Option<Entity>,
    pub spawn_point: Vec3,
    pub gather_anchor: Vec3,
    pub collect_timer: f32,
    pub idle_wait_timer: f32,
    pub interaction_elapsed: f32,
    pub has_played_collect_animation: bool,
    pub auto_consume_enabled: bool,
    pub low_flags: LowNeedFlags,
    pub wander: Option<WanderActivity>,
    pub push_back: Option<PushBack>,
    pub invincible_timer: f32,
    // One-shot bark flags, reset when the wave clears.
    pub first_hit_barked: bool,
    pub alert_mid_barked: bool,
    pub alert_high_barked: bool,
}

impl Companion {
    pub fn new(spawn_point: Vec3) -> Self {
        Self {
            current_task: CompanionTask::Idle,
            previous_task: CompanionTask::Idle,
            destination: spawn_point,
            saved_destination: Vec3::ZERO,
            is_being_interacted: false,
            is_being_attacked: false,
            is_dying: false,
            resource_target: None,
            spawn_point,
            gather_anchor: spawn_point,
            collect_timer: 0.0,
            idle_wait_timer: 0.0,
            interaction_elapsed: 0.0,
            has_played_collect_animation: false,
            auto_consume_enabled: false,
            low_flags: LowNeedFlags::default(),
            wander: None,
            push_back: None,
            invincible_timer: 0.0,
            first_hit_barked: false,
            alert_mid_barked: false,
            alert_high_barked: false,
        }
    }

    /// Guarded transition entry point. Returns whether the request was
    /// accepted; a rejection has no side effects beyond the
    /// nothing-to-flee-from bark for a groundless shelter request.
    pub fn try_request_task(
        &mut self,
        new_task: CompanionTask,
        hostiles_present: bool,
        position: Vec3,
        events: &mut TickEvents,
    ) -> bool {
        if !transition_allowed(self.current_task, new_task, self.is_being_interacted) {
            return false;
        }

        // Shelter is only enterable while hostiles are around.
        if new_task == CompanionTask::MovingToShelter && !hostiles_present {
            events.bark(bark_scenarios::NOTHING_TO_FLEE);
            return false;
        }

        self.commit_task(new_task, false, position, events);
        true
    }

    /// Unconditional transition. Records the interrupted task for later
    /// resumption, runs entry side effects, and cancels the idle wander.
    pub fn commit_task(
        &mut self,
        new_task: CompanionTask,
        dialogue_override: bool,
        position: Vec3,
        events: &mut TickEvents,
    ) {
        if self.current_task == CompanionTask::GatheringResource {
            for name in ["chop tree", "pull grass", "chisel rock"] {
                events.animation_bool(name, false);
            }
        }
        self.has_played_collect_animation = false;

        if self.current_task.records_previous() {
            if self.current_task == CompanionTask::MovingToPlace {
                self.saved_destination = self.destination;
            }
            self.previous_task = self.current_task;
        }

        events.emit(EventKind::TaskChanged {
            from: self.current_task.label().to_string(),
            to: new_task.label().to_string(),
        });
        self.current_task = new_task;

        match new_task {
            CompanionTask::Pat => {
                debug_assert!(false, "deprecated pat task committed");
                tracing::error!("deprecated pat task committed");
            }
            CompanionTask::Feed => {
                self.is_being_interacted = true;
                self.interaction_elapsed = 0.0;
                events.animation_trigger("eat");
            }
            CompanionTask::InDialogue => {
                self.is_being_interacted = true;
                self.interaction_elapsed = 0.0;
                if !dialogue_override {
                    events.emit(EventKind::DialogueRequested);
                }
            }
            CompanionTask::ProcessFuel => {
                self.is_being_interacted = true;
                self.interaction_elapsed = 0.0;
                events.animation_trigger("eat");
            }
            CompanionTask::FindingResource => {
                self.gather_anchor = position;
            }
            _ => {}
        }

        // Resuming an interrupted gather re-enters through the move-to step.
        if self.previous_task == CompanionTask::GatheringResource {
            self.previous_task = CompanionTask::MovingToResource;
        }

        self.wander = None;
        self.idle_wait_timer = 0.0;
    }

    /// Completion callback for Feed/InDialogue/ProcessFuel: resume whatever
    /// was interrupted (restoring the saved move destination) and release
    /// the interaction lock. The caller settles any fuel transfer first.
    pub fn resume_after_interaction(&mut self, position: Vec3, events: &mut TickEvents) {
        let prev = self.previous_task;
        self.commit_task(prev, false, position, events);
        if prev == CompanionTask::MovingToPlace {
            self.destination = self.saved_destination;
        }
        self.is_being_interacted = false;
    }

    /// Hit reaction. Returns whether the hit landed (false while
    /// invincible); the caller applies the health damage on a landed hit.
    pub fn being_hit(
        &mut self,
        attacker_pos: Vec3,
        position: Vec3,
        cfg: &AiConfig,
        events: &mut TickEvents,
    ) -> bool {
        if !self.first_hit_barked {
            events.bark(bark_scenarios::FIRST_HIT);
            self.first_hit_barked = true;
        }

        if self.invincible_timer > 0.0 {
            return false;
        }
        self.invincible_timer = cfg.invincible_duration;

        let mut direction = position - attacker_pos;
        direction.y = 0.0;
        self.push_back = Some(PushBack {
            direction: direction.normalize_or_zero(),
            remaining: cfg.push_back_duration,
        });
        self.is_being_interacted = false;
        events.animation_trigger("hurt");
        true
    }

    /// Wave bookkeeping: the hostile pool emptied.
    pub fn wave_cleared(&mut self, events: &mut TickEvents) {
        events.bark(bark_scenarios::ENEMIES_CLEARED);
        self.first_hit_barked = false;
        self.alert_mid_barked = false;
        self.alert_high_barked = false;
    }
}

/// Dialogue-selection helper: sanity counts as low below a fraction of max.
pub fn is_sanity_low(needs: &NeedSet, fraction: f32) -> bool {
    needs
        .get(NeedKind::Sanity)
        .map(|s| s.value() < s.max_value() * fraction)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use CompanionTask::*;

    fn companion() -> (Companion, TickEvents) {
        (Companion::new(Vec3::ZERO), TickEvents::new())
    }

    #[test]
    fn test_guard_combat_rejects_interactions_and_gathering() {
        for requested in [InDialogue, FindingResource, Pat, ProcessFuel] {
            assert!(!transition_allowed(BeingAttacked, requested, false));
        }
        // Combat still accepts flee and follow orders.
        assert!(transition_allowed(BeingAttacked, MovingToShelter, false));
        assert!(transition_allowed(BeingAttacked, Follow, false));
        assert!(transition_allowed(BeingAttacked, Feed, false));
    }

    #[test]
    fn test_guard_gathering_rejects_social_triggers() {
        for current in [FindingResource, MovingToResource, GatheringResource] {
            assert!(!transition_allowed(current, InDialogue, false));
            assert!(!transition_allowed(current, Pat, false));
            // Combat detection and explicit commands still get through.
            assert!(transition_allowed(current, BeingAttacked, false));
            assert!(transition_allowed(current, Follow, false));
            assert!(transition_allowed(current, MovingToShelter, false));
        }
    }

    #[test]
    fn test_guard_interactions_serialize() {
        for current in [Feed, InDialogue, ProcessFuel, Pat] {
            assert!(!transition_allowed(current, Feed, true));
            assert!(transition_allowed(current, Feed, false));
        }
    }

    #[test]
    fn test_request_rejected_without_side_effects() {
        let (mut companion, mut events) = companion();
        companion.commit_task(FindingResource, false, Vec3::ZERO, &mut events);
        companion.commit_task(MovingToResource, false, Vec3::ZERO, &mut events);
        companion.commit_task(GatheringResource, false, Vec3::ZERO, &mut events);
        events.drain();

        assert!(!companion.try_request_task(InDialogue, false, Vec3::ZERO, &mut events));
        assert_eq!(companion.current_task, GatheringResource);
        assert!(!companion.is_being_interacted);
        assert!(events.is_empty());
    }

    #[test]
    fn test_idle_accepts_dialogue() {
        let (mut companion, mut events) = companion();
        assert!(companion.try_request_task(InDialogue, false, Vec3::ZERO, &mut events));
        assert_eq!(companion.current_task, InDialogue);
        assert!(companion.is_being_interacted);
    }

    #[test]
    fn test_shelter_request_needs_hostiles() {
        let (mut companion, mut events) = companion();
        assert!(!companion.try_request_task(MovingToShelter, false, Vec3::ZERO, &mut events));
        assert_eq!(companion.current_task, Idle);
        let drained = events.drain();
        assert!(drained.iter().any(|e| matches!(
            e.kind,
            companion_events::EventKind::Bark {
                id: bark_scenarios::NOTHING_TO_FLEE
            }
        )));

        assert!(companion.try_request_task(MovingToShelter, true, Vec3::ZERO, &mut events));
        assert_eq!(companion.current_task, MovingToShelter);
    }

    #[test]
    fn test_commit_records_previous_and_folds_gathering() {
        let (mut companion, mut events) = companion();
        companion.commit_task(FindingResource, false, Vec3::ZERO, &mut events);
        companion.commit_task(MovingToResource, false, Vec3::ZERO, &mut events);
        companion.commit_task(GatheringResource, false, Vec3::ZERO, &mut events);

        companion.commit_task(BeingAttacked, false, Vec3::ZERO, &mut events);
        // Gathering folds forward to the move-to step.
        assert_eq!(companion.previous_task, MovingToResource);
    }

    #[test]
    fn test_commit_snapshots_move_destination() {
        let (mut companion, mut events) = companion();
        companion.commit_task(MovingToPlace, false, Vec3::ZERO, &mut events);
        companion.destination = Vec3::new(4.0, 0.0, 2.0);

        companion.commit_task(InDialogue, false, Vec3::ZERO, &mut events);
        companion.destination = Vec3::ZERO;
        companion.resume_after_interaction(Vec3::ZERO, &mut events);

        assert_eq!(companion.current_task, MovingToPlace);
        assert_eq!(companion.destination, Vec3::new(4.0, 0.0, 2.0));
        assert!(!companion.is_being_interacted);
    }

    #[test]
    fn test_commit_cancels_wander_and_idle_timer() {
        let (mut companion, mut events) = companion();
        companion.wander = Some(WanderActivity { wait_remaining: 3.0 });
        companion.idle_wait_timer = 12.0;

        companion.commit_task(Follow, false, Vec3::ZERO, &mut events);
        assert!(companion.wander.is_none());
        assert_eq!(companion.idle_wait_timer, 0.0);
    }

    #[test]
    fn test_finding_resource_snapshots_anchor() {
        let (mut companion, mut events) = companion();
        let here = Vec3::new(10.0, 0.0, -3.0);
        companion.commit_task(FindingResource, false, here, &mut events);
        assert_eq!(companion.gather_anchor, here);
    }

    #[test]
    fn test_hit_respects_invincibility_window() {
        let (mut companion, mut events) = companion();
        let cfg = AiConfig::default();
        assert!(companion.being_hit(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO, &cfg, &mut events));
        assert!(companion.push_back.is_some());
        // Second hit inside the window does not land.
        assert!(!companion.being_hit(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO, &cfg, &mut events));
    }

    #[test]
    fn test_low_flag_priority_order() {
        let mut flags = LowNeedFlags::default();
        assert_eq!(flags.highest_priority(), None);
        flags.insert(NeedKind::Sanity);
        flags.insert(NeedKind::Hunger);
        assert_eq!(flags.highest_priority(), Some(NeedKind::Hunger));
        flags.insert(NeedKind::Health);
        assert_eq!(flags.highest_priority(), Some(NeedKind::Health));
        flags.remove(NeedKind::Health);
        flags.remove(NeedKind::Hunger);
        assert_eq!(flags.highest_priority(), Some(NeedKind::Sanity));
    }
}
