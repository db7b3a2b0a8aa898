//! Needs Tick System
//!
//! Advances passive decay and the bleed couplings for every actor's needs.
//! Edge handling lives in `systems::status`; this system only drives time
//! forward.

use bevy_ecs::prelude::*;

use companion_events::EventKind;

use crate::components::companion::Companion;
use crate::components::needs::NeedSet;
use crate::components::world::WorldClock;
use crate::events::TickEvents;

pub fn tick_needs(clock: Res<WorldClock>, mut query: Query<&mut NeedSet>) {
    for mut needs in query.iter_mut() {
        needs.tick(clock.dt);
    }
}

/// Forwards need edges of non-companion actors (the player's fuel) straight
/// to the outbound queue. The companion's edges get richer handling in
/// `systems::status`.
pub fn forward_actor_events(
    mut events: ResMut<TickEvents>,
    mut query: Query<&mut NeedSet, Without<Companion>>,
) {
    for mut needs in query.iter_mut() {
        for (kind, event) in needs.drain_events() {
            if let Some(edge) = super::status::edge_kind(event) {
                events.emit(EventKind::NeedEdge {
                    need: kind.label().to_string(),
                    edge,
                });
            }
        }
    }
}
