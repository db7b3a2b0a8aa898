//! Configuration System
//!
//! Loads tuning parameters from tuning.toml for easy adjustment without
//! recompiling. Every gameplay constant the core consumes lives here.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default tuning file path
pub const DEFAULT_TUNING_PATH: &str = "tuning.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub needs: NeedsConfig,
    pub ai: AiConfig,
    pub gather: GatherConfig,
    pub movement: MovementConfig,
}

/// Simulation loop parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Game-seconds advanced per tick
    pub tick_seconds: f32,
    pub default_ticks: u64,
}

/// Need pools and decay rates
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NeedsConfig {
    pub health_max: f32,
    pub health_low_threshold: f32,
    pub hunger_max: f32,
    pub hunger_low_threshold: f32,
    pub sanity_max: f32,
    pub sanity_low_threshold: f32,
    pub fuel_max: f32,
    pub fuel_low_threshold: f32,

    pub hunger_decay_per_sec: f32,
    pub sanity_decay_per_sec: f32,
    /// Health bleed while hunger sits in low state
    pub health_bleed_when_hungry: f32,
    /// Health bleed while sanity sits in low state
    pub health_bleed_when_insane: f32,
    /// Seconds between decay applications
    pub decay_interval: f32,
    /// Sanity cost of eating raw food
    pub raw_food_sanity_cost: f32,
}

/// Companion AI behavior parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Seconds of plain idling before wandering back to spawn
    pub wait_before_idle_at_spawn: f32,
    /// Squared-distance threshold for hostile detection
    pub detect_range_sq: f32,
    pub follow_offset: [f32; 2],
    pub resource_scan_range: f32,
    /// Longest acceptable path to a resource candidate
    pub max_path_length: f32,
    pub collect_interval: f32,
    pub collect_radius: f32,
    pub shelter_stopping_distance: f32,
    pub wander_radius: f32,
    pub wander_wait_min: f32,
    pub wander_wait_max: f32,
    /// Stand-in for the interact animation length
    pub interact_duration: f32,
    /// Fuel granted to the player when a fuel item finishes processing
    pub process_fuel_amount: f32,
    pub push_back_duration: f32,
    pub push_back_speed: f32,
    pub invincible_duration: f32,
    /// Sanity-low helper threshold as a fraction of max
    pub sanity_low_fraction: f32,
}

/// Per-kind gather damage
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatherConfig {
    pub wood_chopping_damage: f32,
    pub foraging_damage: f32,
    pub mining_damage: f32,
}

/// Movement parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub base_speed: f32,
    pub stopping_distance: f32,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from default path, or use defaults if not found
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_TUNING_PATH).unwrap_or_else(|e| {
            tracing::warn!("could not load {}: {}. Using defaults", DEFAULT_TUNING_PATH, e);
            Self::default()
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            needs: NeedsConfig::default(),
            ai: AiConfig::default(),
            gather: GatherConfig::default(),
            movement: MovementConfig::default(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 0.1,
            default_ticks: 3000,
        }
    }
}

impl Default for NeedsConfig {
    fn default() -> Self {
        Self {
            health_max: 100.0,
            health_low_threshold: 30.0,
            hunger_max: 100.0,
            hunger_low_threshold: 30.0,
            sanity_max: 100.0,
            sanity_low_threshold: 30.0,
            fuel_max: 100.0,
            fuel_low_threshold: 20.0,
            hunger_decay_per_sec: 0.2,
            sanity_decay_per_sec: 0.2,
            health_bleed_when_hungry: 1.0,
            health_bleed_when_insane: 1.0,
            decay_interval: 1.0,
            raw_food_sanity_cost: 5.0,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            wait_before_idle_at_spawn: 30.0,
            detect_range_sq: 35.0,
            follow_offset: [-1.0, -0.5],
            resource_scan_range: 30.0,
            max_path_length: 100.0,
            collect_interval: 0.5,
            collect_radius: 1.0,
            shelter_stopping_distance: 2.0,
            wander_radius: 5.0,
            wander_wait_min: 5.0,
            wander_wait_max: 10.0,
            interact_duration: 1.5,
            process_fuel_amount: 15.0,
            push_back_duration: 0.3,
            push_back_speed: 1.0,
            invincible_duration: 1.0,
            sanity_low_fraction: 0.75,
        }
    }
}

impl Default for GatherConfig {
    fn default() -> Self {
        Self {
            wood_chopping_damage: 0.2,
            foraging_damage: 0.2,
            mining_damage: 0.2,
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            base_speed: 3.5,
            stopping_distance: 0.5,
        }
    }
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.needs.health_max, 100.0);
        assert_eq!(config.ai.max_path_length, 100.0);
        assert!(config.simulation.tick_seconds > 0.0);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [needs]
            hunger_decay_per_sec = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.needs.hunger_decay_per_sec, 0.5);
        assert_eq!(config.needs.sanity_decay_per_sec, 0.2);
        assert_eq!(config.ai.collect_interval, 0.5);
    }
}
