//! Auto-Consume System
//!
//! When enabled, services the single highest-priority low need per tick
//! (health, then hunger, then sanity) from the player's held slots, using
//! the highest-value matching consumable and taking one from its stack.

use bevy_ecs::prelude::*;

use crate::components::companion::Companion;
use crate::components::items::{ConsumableEffect, HeldSlots};
use crate::components::needs::NeedSet;
use crate::components::world::Tuning;
use crate::events::TickEvents;

pub fn auto_consume(
    tuning: Res<Tuning>,
    mut events: ResMut<TickEvents>,
    mut slots: ResMut<HeldSlots>,
    mut companions: Query<(&Companion, &mut NeedSet)>,
) {
    for (companion, mut needs) in companions.iter_mut() {
        if !companion.auto_consume_enabled || companion.is_dying {
            continue;
        }
        // One consumable per tick, highest-priority need first.
        let Some(kind) = companion.low_flags.highest_priority() else {
            continue;
        };
        let effect = ConsumableEffect::for_need(kind);
        let Some(index) = slots.best_matching(effect) else {
            continue;
        };
        let Some(consumable) = slots.slots[index].consumable.clone() else {
            continue;
        };

        events.sfx("auto_consume");
        if consumable.apply(&mut needs, tuning.0.needs.raw_food_sanity_cost, &mut events) {
            slots.take_one(index);
        }
    }
}
