//! Event plumbing: the per-tick outbound queue and the JSONL logger.

pub mod logger;

use bevy_ecs::prelude::*;

use companion_events::{CompanionEvent, EventKind, TickStamp};

pub use logger::EventLogger;

/// Resource collecting the events generated this tick.
///
/// Systems push outbound requests (animation, barks, sfx, task changes) here;
/// the end of the tick drains the queue into the logger and any other
/// collaborator adapters.
#[derive(Resource, Debug, Default)]
pub struct TickEvents {
    events: Vec<CompanionEvent>,
    next_event_id: u64,
    stamp: TickStamp,
}

impl TickEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the timestamp applied to events emitted this tick.
    pub fn set_stamp(&mut self, stamp: TickStamp) {
        self.stamp = stamp;
    }

    pub fn emit(&mut self, kind: EventKind) {
        let id = format!("evt_{:08}", self.next_event_id);
        self.next_event_id += 1;
        self.events.push(CompanionEvent::new(id, self.stamp, kind));
    }

    pub fn bark(&mut self, id: u32) {
        self.emit(EventKind::Bark { id });
    }

    pub fn sfx(&mut self, key: impl Into<String>) {
        self.emit(EventKind::Sfx { key: key.into() });
    }

    pub fn animation_trigger(&mut self, name: impl Into<String>) {
        self.emit(EventKind::AnimationTrigger { name: name.into() });
    }

    pub fn animation_bool(&mut self, name: impl Into<String>, value: bool) {
        self.emit(EventKind::AnimationBool {
            name: name.into(),
            value,
        });
    }

    pub fn drain(&mut self) -> Vec<CompanionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Read-only view of the queued events, mostly for tests.
    pub fn pending(&self) -> &[CompanionEvent] {
        &self.events
    }
}
