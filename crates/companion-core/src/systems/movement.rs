//! Movement Integration
//!
//! Kinematic stand-in for the external navigation agent: resolves pending
//! path requests and steps agents toward their destinations. Also keeps the
//! agent's speed in sync with the upgradable moving-speed attribute.

use bevy_ecs::prelude::*;
use glam::Vec3;

use crate::attributes::CompanionAttributes;
use crate::components::world::{MoveAgent, Position, WorldClock};

pub fn sync_upgraded_speed(mut query: Query<(&CompanionAttributes, &mut MoveAgent)>) {
    for (attrs, mut agent) in query.iter_mut() {
        agent.speed = attrs.moving_speed.current();
    }
}

pub fn advance_agents(clock: Res<WorldClock>, mut query: Query<(&mut Position, &mut MoveAgent)>) {
    for (mut pos, mut agent) in query.iter_mut() {
        // Path requests issued this tick resolve here.
        agent.path_pending = false;

        let Some(dest) = agent.destination else {
            agent.velocity = Vec3::ZERO;
            continue;
        };
        if agent.is_stopped {
            agent.velocity = Vec3::ZERO;
            continue;
        }

        let to = dest - pos.0;
        let distance = to.length();
        if distance <= agent.stopping_distance.max(1e-4) {
            agent.velocity = Vec3::ZERO;
            continue;
        }

        let direction = to / distance;
        let step = (agent.speed * clock.dt).min(distance - agent.stopping_distance);
        pos.0 += direction * step;
        agent.velocity = direction * agent.speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::world::has_arrived;

    #[test]
    fn test_agent_walks_to_stopping_distance_and_settles() {
        let mut world = World::new();
        world.insert_resource(WorldClock::new(0.1));
        let entity = world
            .spawn((Position::new(0.0, 0.0, 0.0), {
                let mut agent = MoveAgent::new(2.0, 0.5);
                agent.set_destination(Vec3::new(0.0, 0.0, 3.0));
                agent
            }))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(advance_agents);
        for _ in 0..30 {
            schedule.run(&mut world);
        }

        let pos = world.get::<Position>(entity).unwrap().0;
        let agent = world.get::<MoveAgent>(entity).unwrap();
        assert!((pos.z - 2.5).abs() < 1e-3);
        assert_eq!(agent.velocity, Vec3::ZERO);
        assert!(has_arrived(agent, pos));
    }

    #[test]
    fn test_stopped_agent_does_not_move() {
        let mut world = World::new();
        world.insert_resource(WorldClock::new(0.1));
        let entity = world
            .spawn((Position::new(0.0, 0.0, 0.0), {
                let mut agent = MoveAgent::new(2.0, 0.5);
                agent.set_destination(Vec3::new(0.0, 0.0, 3.0));
                agent.is_stopped = true;
                agent
            }))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(advance_agents);
        schedule.run(&mut world);

        assert_eq!(world.get::<Position>(entity).unwrap().0, Vec3::ZERO);
    }
}
