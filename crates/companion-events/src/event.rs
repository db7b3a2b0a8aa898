//! Event Types
//!
//! Everything the behavioral core tells the outside world — task changes,
//! need edges, and requests aimed at the excluded collaborators (animation,
//! barks, sfx, shelter) — is expressed as one of these events. Consumers
//! read them from the per-tick queue or the JSONL log.

use serde::{Deserialize, Serialize};

use crate::timestamp::TickStamp;

/// Bark scenario ids, matching the voice-line table the bark spawner owns.
pub mod bark_scenarios {
    /// Enemy alert has reached the mid threshold.
    pub const ALERT_MID: u32 = 1;
    /// Enemy alert has reached the high threshold.
    pub const ALERT_HIGH: u32 = 2;
    /// A hostile died nearby.
    pub const MONSTER_DIED: u32 = 3;
    /// First hit taken this wave.
    pub const FIRST_HIT: u32 = 4;
    /// Health entered low state.
    pub const LOW_HEALTH: u32 = 5;
    /// All enemies cleared.
    pub const ENEMIES_CLEARED: u32 = 6;
    /// Hunger entered low state.
    pub const LOW_HUNGER: u32 = 12;
    /// Hunger fully depleted.
    pub const HUNGER_DEPLETED: u32 = 13;
    /// Sanity entered low state.
    pub const LOW_SANITY: u32 = 14;
    /// Sanity fully depleted.
    pub const SANITY_DEPLETED: u32 = 15;
    /// Refused food (already full).
    pub const FEED_REFUSED: u32 = 16;
    /// Resource search found nothing.
    pub const NOTHING_FOUND: u32 = 17;
    /// Refused fuel processing.
    pub const PROCESS_REFUSED: u32 = 18;
    /// Shelter requested with no hostiles around.
    pub const NOTHING_TO_FLEE: u32 = 19;
    /// Ate raw food.
    pub const RAW_FOOD: u32 = 20;
}

/// Which edge a need crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeedEdgeKind {
    EnteringLowState,
    ExitingLowState,
    Depleting,
    Recovering,
}

/// Payload of a single companion event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// The controller committed a task transition.
    TaskChanged { from: String, to: String },
    /// A need crossed a low-state or depletion edge.
    NeedEdge { need: String, edge: NeedEdgeKind },
    /// Request to the animation collaborator: fire a trigger.
    AnimationTrigger { name: String },
    /// Request to the animation collaborator: set a looping bool.
    AnimationBool { name: String, value: bool },
    /// Request to the bark spawner: play scenario `id`.
    Bark { id: u32 },
    /// Request to the audio collaborator.
    Sfx { key: String },
    /// Request to the dialogue collaborator: pick and play the line that
    /// fits the companion's current state.
    DialogueRequested,
    /// The companion entered or left the shelter.
    ShelterOccupied { occupied: bool },
    /// A resource node was fully collected.
    ResourceCollected {
        #[serde(rename = "resource_kind")]
        kind: String,
    },
    /// The companion's health depleted; the death sequence started.
    CompanionDied,
}

/// A single logged event with identity and timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionEvent {
    /// Sequential id, e.g. "evt_00000001".
    pub event_id: String,
    pub timestamp: TickStamp,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl CompanionEvent {
    pub fn new(event_id: impl Into<String>, timestamp: TickStamp, kind: EventKind) -> Self {
        Self {
            event_id: event_id.into(),
            timestamp,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_roundtrip() {
        let event = CompanionEvent::new(
            "evt_00000001",
            TickStamp::new(12, 1.2),
            EventKind::TaskChanged {
                from: "idle".to_string(),
                to: "in_dialogue".to_string(),
            },
        );
        let json = serde_json::to_string(&event).unwrap();
        let parsed: CompanionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, parsed);
    }

    #[test]
    fn test_kind_tag_is_flattened() {
        let event = CompanionEvent::new(
            "evt_00000002",
            TickStamp::start(),
            EventKind::Bark {
                id: bark_scenarios::NOTHING_FOUND,
            },
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""kind":"bark""#));
        assert!(json.contains(r#""id":17"#));
    }

    #[test]
    fn test_need_edge_serialization() {
        let edge = NeedEdgeKind::EnteringLowState;
        assert_eq!(
            serde_json::to_string(&edge).unwrap(),
            r#""entering_low_state""#
        );
    }
}
