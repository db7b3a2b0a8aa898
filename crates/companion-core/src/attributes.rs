//! Upgradable Attributes
//!
//! A scalar stat with a fixed base and additive upgrades, used for the
//! companion's moving speed and per-kind gather damage.

use bevy_ecs::prelude::*;

#[derive(Debug, Clone)]
pub struct UpgradableAttribute {
    base: f32,
    upgraded: f32,
}

impl UpgradableAttribute {
    pub fn new(base: f32) -> Self {
        Self {
            base,
            upgraded: 0.0,
        }
    }

    pub fn current(&self) -> f32 {
        self.base + self.upgraded
    }

    pub fn base(&self) -> f32 {
        self.base
    }

    /// Applies an additive upgrade.
    pub fn upgrade(&mut self, amount: f32) {
        self.upgraded += amount;
    }
}

/// Component: the companion's upgradable stats.
#[derive(Component, Debug, Clone)]
pub struct CompanionAttributes {
    pub moving_speed: UpgradableAttribute,
    pub wood_chopping_damage: UpgradableAttribute,
    pub foraging_damage: UpgradableAttribute,
    pub mining_damage: UpgradableAttribute,
}

impl CompanionAttributes {
    pub fn new(speed: f32, wood: f32, forage: f32, mining: f32) -> Self {
        Self {
            moving_speed: UpgradableAttribute::new(speed),
            wood_chopping_damage: UpgradableAttribute::new(wood),
            foraging_damage: UpgradableAttribute::new(forage),
            mining_damage: UpgradableAttribute::new(mining),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upgrades_are_additive() {
        let mut attr = UpgradableAttribute::new(0.2);
        attr.upgrade(0.1);
        attr.upgrade(0.05);
        assert!((attr.current() - 0.35).abs() < 1e-6);
        assert_eq!(attr.base(), 0.2);
    }
}
