//! Components and component-adjacent state for the companion core.

pub mod companion;
pub mod items;
pub mod needs;
pub mod world;

pub use companion::{
    is_sanity_low, transition_allowed, Companion, CompanionTask, LowNeedFlags, PushBack,
    WanderActivity,
};
pub use items::{Consumable, ConsumableEffect, HeldSlots, ItemSlot};
pub use needs::{DecayParams, Need, NeedEvent, NeedKind, NeedOutcome, NeedSet};
pub use world::{
    has_arrived, EnemyAlert, Hostile, MoveAgent, Player, Position, ResourceKind, ResourceNode,
    Shelter, Tuning, WaveState, WorldClock,
};
