//! Navigation Boundary
//!
//! Pathfinding internals live outside the core. The controller only asks two
//! questions — can I get there, and how far is the walk — through the
//! `Pathfinder` capability injected at construction time. `OpenFieldNav` is
//! the straight-line stand-in used by demos and tests.

use bevy_ecs::prelude::*;
use glam::Vec3;

/// Navigation queries the core is allowed to make.
pub trait Pathfinder: Send + Sync {
    /// Whether a complete path from `from` to `to` exists.
    fn is_reachable(&self, from: Vec3, to: Vec3) -> bool;

    /// Length of the full path, or `None` when no complete path exists.
    fn path_length(&self, from: Vec3, to: Vec3) -> Option<f32>;

    /// Whether a point is on navigable ground (used to clamp push-back
    /// displacement).
    fn is_navigable(&self, point: Vec3) -> bool {
        let _ = point;
        true
    }
}

/// Resource wrapping the injected pathfinder.
#[derive(Resource)]
pub struct NavService(pub Box<dyn Pathfinder>);

impl NavService {
    pub fn new(pathfinder: impl Pathfinder + 'static) -> Self {
        Self(Box::new(pathfinder))
    }
}

/// A circular no-go region for the open-field stand-in.
#[derive(Debug, Clone, Copy)]
pub struct BlockedCircle {
    pub center: Vec3,
    pub radius: f32,
}

/// Straight-line navigation over open ground with optional blocked circles.
#[derive(Debug, Clone, Default)]
pub struct OpenFieldNav {
    pub blocked: Vec<BlockedCircle>,
}

impl OpenFieldNav {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocked(blocked: Vec<BlockedCircle>) -> Self {
        Self { blocked }
    }

    fn in_blocked(&self, point: Vec3) -> bool {
        self.blocked
            .iter()
            .any(|c| point.distance_squared(c.center) <= c.radius * c.radius)
    }
}

impl Pathfinder for OpenFieldNav {
    fn is_reachable(&self, _from: Vec3, to: Vec3) -> bool {
        !self.in_blocked(to)
    }

    fn path_length(&self, from: Vec3, to: Vec3) -> Option<f32> {
        if self.in_blocked(to) {
            return None;
        }
        Some(from.distance(to))
    }

    fn is_navigable(&self, point: Vec3) -> bool {
        !self.in_blocked(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_field_is_reachable_everywhere() {
        let nav = OpenFieldNav::new();
        assert!(nav.is_reachable(Vec3::ZERO, Vec3::new(100.0, 0.0, 100.0)));
        assert_eq!(
            nav.path_length(Vec3::ZERO, Vec3::new(3.0, 0.0, 4.0)),
            Some(5.0)
        );
    }

    #[test]
    fn test_blocked_circle_cuts_reachability() {
        let nav = OpenFieldNav::with_blocked(vec![BlockedCircle {
            center: Vec3::new(10.0, 0.0, 0.0),
            radius: 2.0,
        }]);
        assert!(!nav.is_reachable(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)));
        assert_eq!(nav.path_length(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)), None);
        assert!(nav.is_reachable(Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0)));
        assert!(!nav.is_navigable(Vec3::new(9.0, 0.0, 0.0)));
    }
}
