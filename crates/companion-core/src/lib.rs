//! Companion Behavioral Core
//!
//! The needs model and task controller for a survival game's companion NPC:
//! continuously-decaying needs with hysteresis-latched edge events, and a
//! priority-guarded state machine that decides the companion's
//! moment-to-moment activity. Runs headless on `bevy_ecs`; rendering,
//! audio, dialogue, and pathfinding internals stay outside and are reached
//! through events and injected capabilities.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod attributes;
pub mod components;
pub mod config;
pub mod events;
pub mod locator;
pub mod nav;
pub mod setup;
pub mod systems;

pub use attributes::{CompanionAttributes, UpgradableAttribute};
pub use components::*;
pub use config::Config;
pub use events::{EventLogger, TickEvents};
pub use locator::{Candidate, ResourceLocator};
pub use nav::{NavService, OpenFieldNav, Pathfinder};

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
