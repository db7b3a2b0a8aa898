//! Need-Edge Reactions
//!
//! Drains the edges the companion's needs produced this tick and turns them
//! into low-need flags, barks, sfx, and the death sequence. Handlers here
//! only flip controller state; task behavior runs later in the same tick.

use bevy_ecs::prelude::*;
use tracing::info;

use companion_events::{bark_scenarios, EventKind, NeedEdgeKind};

use crate::components::companion::Companion;
use crate::components::needs::{NeedEvent, NeedKind, NeedSet};
use crate::events::TickEvents;

/// Maps an internal need event to its serializable edge, if it is one.
pub fn edge_kind(event: NeedEvent) -> Option<NeedEdgeKind> {
    match event {
        NeedEvent::EnteringLowState => Some(NeedEdgeKind::EnteringLowState),
        NeedEvent::ExitingLowState => Some(NeedEdgeKind::ExitingLowState),
        NeedEvent::Depleting => Some(NeedEdgeKind::Depleting),
        NeedEvent::Recovering => Some(NeedEdgeKind::Recovering),
        NeedEvent::ValueIncreased(_) | NeedEvent::ValueDecreased(_) => None,
    }
}

pub fn apply_need_edges(
    mut events: ResMut<TickEvents>,
    mut query: Query<(&mut Companion, &mut NeedSet)>,
) {
    for (mut companion, mut needs) in query.iter_mut() {
        for (kind, event) in needs.drain_events() {
            if let Some(edge) = edge_kind(event) {
                events.emit(EventKind::NeedEdge {
                    need: kind.label().to_string(),
                    edge,
                });
            }

            match (kind, event) {
                (NeedKind::Health, NeedEvent::EnteringLowState) => {
                    events.sfx("low_health");
                    events.bark(bark_scenarios::LOW_HEALTH);
                    companion.low_flags.insert(NeedKind::Health);
                }
                (NeedKind::Health, NeedEvent::ExitingLowState) => {
                    companion.low_flags.remove(NeedKind::Health);
                }
                (NeedKind::Health, NeedEvent::Depleting) => {
                    if !companion.is_dying {
                        companion.is_dying = true;
                        info!("companion health depleted, starting death sequence");
                        events.sfx("companion_die");
                        events.animation_trigger("die");
                        events.emit(EventKind::CompanionDied);
                    }
                }
                (NeedKind::Health, NeedEvent::Recovering) => {
                    events.sfx("health_recover");
                }
                (NeedKind::Health, NeedEvent::ValueIncreased(_)) => {
                    events.sfx("health_recover");
                }

                (NeedKind::Hunger, NeedEvent::EnteringLowState) => {
                    events.sfx("low_hunger");
                    events.bark(bark_scenarios::LOW_HUNGER);
                    companion.low_flags.insert(NeedKind::Hunger);
                }
                (NeedKind::Hunger, NeedEvent::ExitingLowState) => {
                    companion.low_flags.remove(NeedKind::Hunger);
                }
                (NeedKind::Hunger, NeedEvent::Depleting) => {
                    events.sfx("hunger_depleted");
                    events.bark(bark_scenarios::HUNGER_DEPLETED);
                }
                (NeedKind::Hunger, NeedEvent::Recovering) => {
                    events.sfx("hunger_recover");
                }
                (NeedKind::Hunger, NeedEvent::ValueIncreased(_)) => {
                    events.sfx("hunger_recover");
                }

                (NeedKind::Sanity, NeedEvent::EnteringLowState) => {
                    events.sfx("low_sanity");
                    events.bark(bark_scenarios::LOW_SANITY);
                    companion.low_flags.insert(NeedKind::Sanity);
                }
                (NeedKind::Sanity, NeedEvent::ExitingLowState) => {
                    companion.low_flags.remove(NeedKind::Sanity);
                }
                (NeedKind::Sanity, NeedEvent::Depleting) => {
                    events.sfx("sanity_depleted");
                    events.bark(bark_scenarios::SANITY_DEPLETED);
                }
                (NeedKind::Sanity, NeedEvent::Recovering) => {
                    events.sfx("sanity_recover");
                }
                (NeedKind::Sanity, NeedEvent::ValueIncreased(_)) => {
                    events.sfx("sanity_recover");
                }

                _ => {}
            }
        }
    }
}

/// Debug hook: force the companion's health to zero through the normal
/// mutation path, so the death sequence runs like any other depletion.
pub fn kill_companion(needs: &mut NeedSet) {
    if let Some(health) = needs.get(NeedKind::Health) {
        let max = health.max_value();
        needs.modify_value(NeedKind::Health, max);
    }
}
