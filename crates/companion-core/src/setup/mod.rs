//! World Setup
//!
//! Resource initialization, spawn helpers, the tick schedule, and the
//! inbound command helpers the embedding application (or the demo driver)
//! calls between ticks.

use bevy_ecs::prelude::*;
use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::attributes::CompanionAttributes;
use crate::components::companion::{Companion, CompanionTask};
use crate::components::items::HeldSlots;
use crate::components::needs::{NeedKind, NeedSet};
use crate::components::world::{
    EnemyAlert, Hostile, MoveAgent, Player, Position, ResourceKind, ResourceNode, Shelter, Tuning,
    WaveState, WorldClock,
};
use crate::config::Config;
use crate::events::TickEvents;
use crate::locator::ResourceLocator;
use crate::nav::{NavService, OpenFieldNav, Pathfinder};
use crate::systems::{
    advance_agents, apply_need_edges, auto_consume, detect_enemies, execute_task,
    forward_actor_events, sync_upgraded_speed, tick_needs,
};
use crate::SimRng;

/// Stamps the outbound queue with the current tick before anything emits.
pub fn stamp_events(clock: Res<WorldClock>, mut events: ResMut<TickEvents>) {
    events.set_stamp(clock.stamp());
}

/// Builds the per-tick schedule. The chain order is load-bearing: needs
/// advance and their edges are reacted to first, the detection override runs
/// before task execution so a forced combat stance executes the same tick,
/// and movement integrates last.
pub fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            stamp_events,
            tick_needs,
            forward_actor_events,
            apply_need_edges,
            detect_enemies,
            execute_task,
            auto_consume,
            sync_upgraded_speed,
            advance_agents,
        )
            .chain(),
    );
    schedule
}

/// Inserts every resource the schedule expects, with the default open-field
/// navigation stand-in.
pub fn init_resources(world: &mut World, config: Config, seed: u64) {
    init_resources_with_nav(world, config, seed, OpenFieldNav::new());
}

pub fn init_resources_with_nav(
    world: &mut World,
    config: Config,
    seed: u64,
    nav: impl Pathfinder + 'static,
) {
    world.insert_resource(WorldClock::new(config.simulation.tick_seconds));
    world.insert_resource(TickEvents::new());
    world.insert_resource(SimRng(SmallRng::seed_from_u64(seed)));
    world.insert_resource(ResourceLocator::new(config.ai.max_path_length));
    world.insert_resource(NavService::new(nav));
    world.insert_resource(HeldSlots::default());
    world.insert_resource(WaveState::default());
    world.insert_resource(EnemyAlert::default());
    world.insert_resource(Tuning(config));
}

pub fn spawn_companion(world: &mut World, at: Vec3) -> Entity {
    let cfg = world.resource::<Tuning>().0.clone();
    world
        .spawn((
            Companion::new(at),
            Position(at),
            MoveAgent::new(cfg.movement.base_speed, cfg.movement.stopping_distance),
            NeedSet::companion(&cfg.needs),
            CompanionAttributes::new(
                cfg.movement.base_speed,
                cfg.gather.wood_chopping_damage,
                cfg.gather.foraging_damage,
                cfg.gather.mining_damage,
            ),
        ))
        .id()
}

pub fn spawn_player(world: &mut World, at: Vec3) -> Entity {
    let cfg = world.resource::<Tuning>().0.clone();
    world
        .spawn((Player, Position(at), NeedSet::player(&cfg.needs)))
        .id()
}

pub fn spawn_resource(world: &mut World, kind: ResourceKind, at: Vec3, collect_hp: f32) -> Entity {
    world
        .spawn((
            Position(at),
            ResourceNode::new(kind, collect_hp, Vec2::new(1.0, 0.2)),
        ))
        .id()
}

pub fn spawn_hostile(world: &mut World, at: Vec3) -> Entity {
    world.spawn((Hostile, Position(at))).id()
}

pub fn despawn_hostiles(world: &mut World) {
    let mut query = world.query_filtered::<Entity, With<Hostile>>();
    let hostiles: Vec<Entity> = query.iter(world).collect();
    for entity in hostiles {
        world.despawn(entity);
    }
}

pub fn spawn_shelter(world: &mut World, entrance: Vec3) {
    world.insert_resource(Shelter::new(entrance));
}

/// Scatters a ring of random resource nodes around the origin.
pub fn scatter_resources(world: &mut World, count: usize, min_radius: f32, max_radius: f32) {
    let mut rng = {
        let seed = world.resource_mut::<SimRng>().0.gen::<u64>();
        SmallRng::seed_from_u64(seed)
    };
    for _ in 0..count {
        let kind = match rng.gen_range(0..3) {
            0 => ResourceKind::Tree,
            1 => ResourceKind::Bush,
            _ => ResourceKind::Mineral,
        };
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let radius = rng.gen_range(min_radius..max_radius);
        let at = Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
        spawn_resource(world, kind, at, 1.0);
    }
}

/// Inbound command entry point: routes a task request through the guard
/// matrix exactly like any other collaborator. Returns whether the request
/// was accepted.
pub fn request_task(world: &mut World, task: CompanionTask) -> bool {
    let hostiles_present = {
        let mut query = world.query_filtered::<Entity, With<Hostile>>();
        query.iter(world).next().is_some()
    };
    world.resource_scope(|world, mut events: Mut<TickEvents>| {
        let mut query = world.query::<(&Position, &mut Companion)>();
        match query.get_single_mut(world) {
            Ok((pos, mut companion)) => {
                companion.try_request_task(task, hostiles_present, pos.0, &mut events)
            }
            Err(_) => false,
        }
    })
}

/// Inbound command entry point: a player move order toward `point`.
pub fn command_move_to(world: &mut World, point: Vec3) -> bool {
    let accepted = request_task(world, CompanionTask::MovingToPlace);
    if accepted {
        let mut query = world.query::<&mut Companion>();
        if let Ok(mut companion) = query.get_single_mut(world) {
            companion.destination = point;
        }
    }
    accepted
}

/// Inbound hit from the combat collaborator. Returns whether the hit
/// landed; invincibility frames absorb the rest.
pub fn strike_companion(world: &mut World, attacker_pos: Vec3, damage: f32) -> bool {
    world.resource_scope(|world, mut events: Mut<TickEvents>| {
        let cfg = world.resource::<Tuning>().0.ai.clone();
        let mut query = world.query::<(&Position, &mut Companion, &mut NeedSet)>();
        match query.get_single_mut(world) {
            Ok((pos, mut companion, mut needs)) => {
                if companion.being_hit(attacker_pos, pos.0, &cfg, &mut events) {
                    needs.modify_value(NeedKind::Health, damage);
                    true
                } else {
                    false
                }
            }
            Err(_) => false,
        }
    })
}

/// Inbound pause toggle for dialogue/cutscenes: freezes needs decay.
pub fn set_paused(world: &mut World, paused: bool) {
    let mut query = world.query::<&mut NeedSet>();
    for mut needs in query.iter_mut(world) {
        needs.set_paused(paused);
    }
}
