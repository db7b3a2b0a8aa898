//! Resource Locator
//!
//! Stateless nearest-resource query used while the companion hunts for
//! something to gather: nearest uncollected node within the scan radius
//! whose path exists and stays under the path-length cap.

use bevy_ecs::prelude::*;
use glam::Vec3;

use crate::nav::Pathfinder;

/// A candidate node as seen by the locator.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub entity: Entity,
    pub position: Vec3,
    pub collected: bool,
}

/// Resource: the locator service, injected into the controller's systems.
#[derive(Resource, Debug, Clone)]
pub struct ResourceLocator {
    /// Candidates whose walk would exceed this are ignored even when inside
    /// the scan radius.
    pub max_path_length: f32,
}

impl ResourceLocator {
    pub fn new(max_path_length: f32) -> Self {
        Self { max_path_length }
    }

    /// Finds the nearest collectable candidate by straight-line distance
    /// from `anchor`, subject to reachability and the path-length cap.
    pub fn find_nearest(
        &self,
        anchor: Vec3,
        scan_range: f32,
        candidates: impl IntoIterator<Item = Candidate>,
        nav: &dyn Pathfinder,
    ) -> Option<Entity> {
        let mut nearest: Option<(Entity, f32)> = None;

        for candidate in candidates {
            if candidate.collected {
                continue;
            }
            let distance = candidate.position.distance(anchor);
            if distance > scan_range {
                continue;
            }
            if !nav.is_reachable(anchor, candidate.position) {
                continue;
            }
            let Some(path_length) = nav.path_length(anchor, candidate.position) else {
                continue;
            };
            if path_length > self.max_path_length {
                continue;
            }
            if nearest.map_or(true, |(_, d)| distance < d) {
                nearest = Some((candidate.entity, distance));
            }
        }

        nearest.map(|(entity, _)| entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::{BlockedCircle, OpenFieldNav};

    fn candidates(world: &mut World, entries: &[(f32, bool)]) -> Vec<Candidate> {
        entries
            .iter()
            .map(|&(distance, collected)| Candidate {
                entity: world.spawn_empty().id(),
                position: Vec3::new(distance, 0.0, 0.0),
                collected,
            })
            .collect()
    }

    #[test]
    fn test_nearest_wins() {
        let mut world = World::new();
        let nav = OpenFieldNav::new();
        let locator = ResourceLocator::new(100.0);

        let cands = candidates(&mut world, &[(5.0, false), (12.0, false), (40.0, false)]);
        let found = locator.find_nearest(Vec3::ZERO, 30.0, cands.clone(), &nav);
        assert_eq!(found, Some(cands[0].entity));
    }

    #[test]
    fn test_collected_nodes_are_skipped() {
        let mut world = World::new();
        let nav = OpenFieldNav::new();
        let locator = ResourceLocator::new(100.0);

        let cands = candidates(&mut world, &[(5.0, true), (12.0, false), (40.0, false)]);
        let found = locator.find_nearest(Vec3::ZERO, 30.0, cands.clone(), &nav);
        assert_eq!(found, Some(cands[1].entity));
    }

    #[test]
    fn test_scan_range_bounds_the_search() {
        let mut world = World::new();
        let nav = OpenFieldNav::new();
        let locator = ResourceLocator::new(100.0);

        let cands = candidates(&mut world, &[(40.0, false)]);
        assert_eq!(locator.find_nearest(Vec3::ZERO, 30.0, cands, &nav), None);
    }

    #[test]
    fn test_unreachable_candidates_are_skipped() {
        let mut world = World::new();
        let nav = OpenFieldNav::with_blocked(vec![BlockedCircle {
            center: Vec3::new(5.0, 0.0, 0.0),
            radius: 1.0,
        }]);
        let locator = ResourceLocator::new(100.0);

        let cands = candidates(&mut world, &[(5.0, false), (12.0, false)]);
        let found = locator.find_nearest(Vec3::ZERO, 30.0, cands.clone(), &nav);
        assert_eq!(found, Some(cands[1].entity));
    }

    #[test]
    fn test_path_length_cap_applies() {
        let mut world = World::new();
        let nav = OpenFieldNav::new();
        let locator = ResourceLocator::new(10.0);

        let cands = candidates(&mut world, &[(12.0, false)]);
        assert_eq!(locator.find_nearest(Vec3::ZERO, 30.0, cands, &nav), None);
    }
}
