//! World Components
//!
//! Positions, the navigation-agent boundary, gatherable resource nodes,
//! hostiles, the shelter, and the simulation clock.

use bevy_ecs::prelude::*;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use companion_events::TickStamp;

use crate::config::Config;

/// Resource: the loaded tuning configuration.
#[derive(Resource, Debug, Clone)]
pub struct Tuning(pub Config);

/// Resource: current tick, tick length, and elapsed game-seconds.
#[derive(Resource, Debug, Clone)]
pub struct WorldClock {
    pub tick: u64,
    pub dt: f32,
    pub elapsed: f32,
}

impl WorldClock {
    pub fn new(dt: f32) -> Self {
        Self {
            tick: 0,
            dt,
            elapsed: 0.0,
        }
    }

    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed += self.dt;
    }

    pub fn stamp(&self) -> TickStamp {
        TickStamp::new(self.tick, self.elapsed)
    }
}

/// Component: an entity's position in the world.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Vec3);

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vec3::new(x, y, z))
    }
}

/// Component: the navigation-agent boundary.
///
/// The core issues move orders through this component; path computation and
/// steering belong to the external navigation service. The kinematic
/// integration shipped in `systems::movement` is a demo stand-in.
#[derive(Component, Debug, Clone)]
pub struct MoveAgent {
    pub speed: f32,
    pub stopping_distance: f32,
    pub destination: Option<Vec3>,
    pub velocity: Vec3,
    pub is_stopped: bool,
    /// True while a path request is in flight; arrival is never declared
    /// with a recompute pending.
    pub path_pending: bool,
}

impl MoveAgent {
    pub fn new(speed: f32, stopping_distance: f32) -> Self {
        Self {
            speed,
            stopping_distance,
            destination: None,
            velocity: Vec3::ZERO,
            is_stopped: false,
            path_pending: false,
        }
    }

    /// Issues a move order. Re-issuing the same destination does not start
    /// another path request.
    pub fn set_destination(&mut self, point: Vec3) {
        if self.destination != Some(point) {
            self.destination = Some(point);
            self.path_pending = true;
        }
    }

    pub fn has_path(&self) -> bool {
        self.destination.is_some()
    }

    pub fn remaining_distance(&self, position: Vec3) -> f32 {
        self.destination
            .map(|d| position.distance(d))
            .unwrap_or(0.0)
    }
}

/// The three-part arrival check: no path recompute in flight, close enough,
/// and either no path at all or no longer moving. Avoids declaring arrival
/// mid-recompute or while still decelerating.
pub fn has_arrived(agent: &MoveAgent, position: Vec3) -> bool {
    if agent.path_pending {
        return false;
    }
    if agent.remaining_distance(position) > agent.stopping_distance {
        return false;
    }
    !agent.has_path() || agent.velocity.length_squared() == 0.0
}

/// What kind of gatherable a resource node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Tree,
    Bush,
    Mineral,
}

impl ResourceKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Bush => "bush",
            Self::Mineral => "mineral",
        }
    }

    /// The looping gather animation for this kind.
    pub fn gather_animation(self) -> &'static str {
        match self {
            Self::Tree => "chop tree",
            Self::Bush => "pull grass",
            Self::Mineral => "chisel rock",
        }
    }
}

/// Component: a gatherable world resource.
///
/// `has_been_collected` is the single authoritative flag other systems must
/// respect before handing this node to anyone else.
#[derive(Component, Debug, Clone)]
pub struct ResourceNode {
    pub kind: ResourceKind,
    pub collect_hp: f32,
    pub has_been_collected: bool,
    /// Side-approach offset: x to either side, y forward.
    pub collect_offset: Vec2,
}

impl ResourceNode {
    pub fn new(kind: ResourceKind, collect_hp: f32, collect_offset: Vec2) -> Self {
        Self {
            kind,
            collect_hp,
            has_been_collected: false,
            collect_offset,
        }
    }

    /// The left/right approach points around the node.
    pub fn approach_points(&self, node_pos: Vec3) -> (Vec3, Vec3) {
        let mut left = node_pos;
        let mut right = node_pos;
        left.x -= self.collect_offset.x;
        left.z += self.collect_offset.y;
        right.x += self.collect_offset.x;
        right.z += self.collect_offset.y;
        (left, right)
    }

    /// Applies gather damage. Returns true when this call collected the
    /// node; the collected flag is set in the same mutation so a concurrent
    /// query never sees a zero-HP uncollected node.
    pub fn reduce_collect_hp(&mut self, damage: f32) -> bool {
        if self.has_been_collected {
            return false;
        }
        self.collect_hp -= damage;
        if self.collect_hp <= 0.0 {
            self.collect_hp = 0.0;
            self.has_been_collected = true;
            return true;
        }
        false
    }
}

/// Marker component: a hostile actor. The detection override and the
/// shelter guard only care that some of these exist and where they are.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Hostile;

/// Marker component: the player actor the companion follows and feeds from.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Resource: the shelter collaborator, reduced to what the core consumes.
#[derive(Resource, Debug, Clone)]
pub struct Shelter {
    pub entrance: Vec3,
    pub is_damaged: bool,
    pub is_destroyed: bool,
    pub has_companion_sheltered: bool,
}

impl Shelter {
    pub fn new(entrance: Vec3) -> Self {
        Self {
            entrance,
            is_damaged: false,
            is_destroyed: false,
            has_companion_sheltered: false,
        }
    }
}

/// Resource: externally-owned enemy alert levels, consumed for one-shot
/// alert barks.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct EnemyAlert {
    pub mid: bool,
    pub high: bool,
}

/// Resource: hostile-pool bookkeeping between ticks, for wave-cleared and
/// hostile-died reactions.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct WaveState {
    pub last_hostile_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrival_predicate() {
        let mut agent = MoveAgent::new(3.5, 2.0);
        agent.set_destination(Vec3::new(0.0, 0.0, 1.9));
        agent.path_pending = false;
        agent.velocity = Vec3::ZERO;
        // remaining 1.9 <= stopping 2.0, no pending path, zero velocity
        assert!(has_arrived(&agent, Vec3::ZERO));

        // Still moving: not arrived.
        agent.velocity = Vec3::new(0.0, 0.0, 1.0);
        assert!(!has_arrived(&agent, Vec3::ZERO));

        // Path recompute in flight: not arrived.
        agent.velocity = Vec3::ZERO;
        agent.path_pending = true;
        assert!(!has_arrived(&agent, Vec3::ZERO));

        // Too far: not arrived.
        agent.path_pending = false;
        assert!(!has_arrived(&agent, Vec3::new(0.0, 0.0, 10.0)));
    }

    #[test]
    fn test_no_path_counts_as_arrived_in_place() {
        let agent = MoveAgent::new(3.5, 2.0);
        assert!(has_arrived(&agent, Vec3::ZERO));
    }

    #[test]
    fn test_set_destination_pends_once() {
        let mut agent = MoveAgent::new(3.5, 0.5);
        agent.set_destination(Vec3::ONE);
        assert!(agent.path_pending);
        agent.path_pending = false;
        agent.set_destination(Vec3::ONE);
        assert!(!agent.path_pending);
    }

    #[test]
    fn test_resource_node_collects_in_one_mutation() {
        let mut node = ResourceNode::new(ResourceKind::Bush, 0.5, Vec2::new(1.0, 0.2));
        assert!(!node.reduce_collect_hp(0.3));
        assert!(node.reduce_collect_hp(0.3));
        assert!(node.has_been_collected);
        // Further damage is a no-op.
        assert!(!node.reduce_collect_hp(0.3));
    }

    #[test]
    fn test_approach_points_straddle_the_node() {
        let node = ResourceNode::new(ResourceKind::Tree, 1.0, Vec2::new(2.0, 0.5));
        let (left, right) = node.approach_points(Vec3::new(10.0, 0.0, 10.0));
        assert_eq!(left, Vec3::new(8.0, 0.0, 10.5));
        assert_eq!(right, Vec3::new(12.0, 0.0, 10.5));
    }
}
