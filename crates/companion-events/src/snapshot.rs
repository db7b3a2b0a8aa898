//! Save Snapshot Types
//!
//! The key/value pairs the core produces and consumes at the save/load
//! boundary. The surrounding save-file format is owned elsewhere; this crate
//! only defines the companion's slice of it. Task state is intentionally not
//! persisted — a loaded companion always resumes idle.

use serde::{Deserialize, Serialize};

/// Persisted need values for the companion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompanionSnapshot {
    pub health: f32,
    pub hunger: f32,
    pub sanity: f32,
}

impl CompanionSnapshot {
    pub fn new(health: f32, hunger: f32, sanity: f32) -> Self {
        Self {
            health,
            hunger,
            sanity,
        }
    }

    /// Flattens into the (key, value) pairs the save manager stores.
    pub fn to_pairs(&self) -> Vec<(String, f32)> {
        vec![
            ("f_companion_health".to_string(), self.health),
            ("f_companion_hunger".to_string(), self.hunger),
            ("f_companion_sanity".to_string(), self.sanity),
        ]
    }
}
