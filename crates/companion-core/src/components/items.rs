//! Consumable Items
//!
//! The slice of the inventory the core touches: consumables that restore a
//! need, and the player's held-item slots the auto-consume scan reads.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use companion_events::bark_scenarios;

use crate::components::needs::{NeedKind, NeedSet};
use crate::events::TickEvents;

/// Which need a consumable restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumableEffect {
    RecoverHealth,
    RecoverHunger,
    RecoverSanity,
    RecoverFuel,
}

impl ConsumableEffect {
    pub fn need_kind(self) -> NeedKind {
        match self {
            Self::RecoverHealth => NeedKind::Health,
            Self::RecoverHunger => NeedKind::Hunger,
            Self::RecoverSanity => NeedKind::Sanity,
            Self::RecoverFuel => NeedKind::Fuel,
        }
    }

    /// The effect that services a given low need.
    pub fn for_need(kind: NeedKind) -> Self {
        match kind {
            NeedKind::Health => Self::RecoverHealth,
            NeedKind::Hunger => Self::RecoverHunger,
            NeedKind::Sanity => Self::RecoverSanity,
            NeedKind::Fuel => Self::RecoverFuel,
        }
    }
}

/// A consumable item definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consumable {
    pub effect: ConsumableEffect,
    pub value: f32,
    /// Raw food costs sanity to eat.
    pub is_processed: bool,
    /// Fuel-type items are processed for the player rather than eaten.
    pub usable_by_player: bool,
}

impl Consumable {
    /// Tests whether applying this consumable would do anything: the target
    /// need must exist and not already be full.
    pub fn can_apply(&self, needs: &NeedSet) -> bool {
        needs
            .get(self.effect.need_kind())
            .map(|n| !n.is_full())
            .unwrap_or(false)
    }

    /// Applies the consumable to an actor's needs. Returns false (and does
    /// nothing) when the target need is missing or already full. Eating raw
    /// non-sanity food also costs sanity and barks about it.
    pub fn apply(
        &self,
        needs: &mut NeedSet,
        raw_food_sanity_cost: f32,
        events: &mut TickEvents,
    ) -> bool {
        if !self.can_apply(needs) {
            return false;
        }
        let kind = self.effect.need_kind();
        needs.modify_value(kind, -self.value);

        if !self.is_processed
            && self.effect != ConsumableEffect::RecoverSanity
            && needs.get(NeedKind::Sanity).is_some()
        {
            needs.modify_value(NeedKind::Sanity, raw_food_sanity_cost);
            events.bark(bark_scenarios::RAW_FOOD);
            events.sfx("raw_food");
        }
        true
    }
}

/// One held-item slot: a consumable stack or empty.
#[derive(Debug, Clone, Default)]
pub struct ItemSlot {
    pub consumable: Option<Consumable>,
    pub quantity: u32,
}

impl ItemSlot {
    pub fn stack(consumable: Consumable, quantity: u32) -> Self {
        Self {
            consumable: Some(consumable),
            quantity,
        }
    }
}

/// Resource: the player's held-item slots the auto-consume scan reads.
#[derive(Resource, Debug, Clone, Default)]
pub struct HeldSlots {
    pub slots: Vec<ItemSlot>,
}

impl HeldSlots {
    pub fn new(slots: Vec<ItemSlot>) -> Self {
        Self { slots }
    }

    /// Finds the highest-value stack matching `effect`.
    pub fn best_matching(&self, effect: ConsumableEffect) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, slot) in self.slots.iter().enumerate() {
            let Some(consumable) = &slot.consumable else {
                continue;
            };
            if slot.quantity == 0 || consumable.effect != effect {
                continue;
            }
            if best.map_or(true, |(_, v)| consumable.value > v) {
                best = Some((i, consumable.value));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Removes one item from the stack at `index`, clearing it when empty.
    pub fn take_one(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.quantity = slot.quantity.saturating_sub(1);
            if slot.quantity == 0 {
                slot.consumable = None;
            }
        }
    }
}
