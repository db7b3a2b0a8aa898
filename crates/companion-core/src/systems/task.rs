//! Task Execution
//!
//! The per-tick behavior switch: one arm per task. Transitions out of a
//! behavior always go through `Companion::commit_task` so the previous-task
//! bookkeeping stays consistent with interruptions.

use bevy_ecs::prelude::*;
use glam::Vec3;
use rand::Rng;
use tracing::debug;

use companion_events::{bark_scenarios, EventKind};

use crate::attributes::CompanionAttributes;
use crate::components::companion::{Companion, CompanionTask};
use crate::components::needs::{NeedKind, NeedSet};
use crate::components::world::{
    has_arrived, MoveAgent, Player, Position, ResourceKind, ResourceNode, Shelter, Tuning,
    WorldClock,
};
use crate::events::TickEvents;
use crate::locator::{Candidate, ResourceLocator};
use crate::nav::NavService;
use crate::SimRng;

#[allow(clippy::too_many_arguments)]
pub fn execute_task(
    clock: Res<WorldClock>,
    tuning: Res<Tuning>,
    locator: Res<ResourceLocator>,
    nav: Res<NavService>,
    mut events: ResMut<TickEvents>,
    mut rng: ResMut<SimRng>,
    mut shelter: Option<ResMut<Shelter>>,
    mut player: Query<(&Position, &mut NeedSet), (With<Player>, Without<Companion>)>,
    mut nodes: Query<(Entity, &Position, &mut ResourceNode), Without<Companion>>,
    mut companions: Query<
        (&mut Position, &mut Companion, &mut MoveAgent, &CompanionAttributes),
        (Without<Player>, Without<ResourceNode>),
    >,
) {
    let dt = clock.dt;
    let cfg = &tuning.0;

    for (mut pos, mut companion, mut agent, attrs) in companions.iter_mut() {
        if companion.is_dying {
            agent.is_stopped = true;
            continue;
        }

        if companion.invincible_timer > 0.0 {
            companion.invincible_timer -= dt;
        }

        // Push-back displacement owns the companion until it expires.
        if let Some(push) = &mut companion.push_back {
            agent.is_stopped = true;
            let next = pos.0 + push.direction * (cfg.ai.push_back_speed * dt);
            if nav.0.is_navigable(next) {
                pos.0 = next;
            }
            push.remaining -= dt;
            if push.remaining <= 0.0 {
                companion.push_back = None;
                agent.is_stopped = false;
            }
            continue;
        }

        match companion.current_task {
            CompanionTask::Idle => {
                companion.idle_wait_timer += dt;
                if companion.idle_wait_timer > cfg.ai.wait_before_idle_at_spawn {
                    companion.commit_task(CompanionTask::IdleAtSpawn, false, pos.0, &mut events);
                }
            }

            CompanionTask::IdleAtSpawn => {
                if companion.wander.is_none() {
                    companion.wander = Some(crate::components::companion::WanderActivity {
                        wait_remaining: 0.0,
                    });
                }
                let spawn = companion.spawn_point;
                let radius = cfg.ai.wander_radius;
                if let Some(wander) = &mut companion.wander {
                    wander.wait_remaining -= dt;
                    if wander.wait_remaining <= 0.0 {
                        let offset = Vec3::new(
                            rng.0.gen_range(-radius..=radius),
                            0.0,
                            rng.0.gen_range(-radius..=radius),
                        );
                        agent.is_stopped = false;
                        agent.stopping_distance = cfg.movement.stopping_distance;
                        agent.set_destination(spawn + offset);
                        wander.wait_remaining =
                            rng.0.gen_range(cfg.ai.wander_wait_min..=cfg.ai.wander_wait_max);
                    }
                }
            }

            CompanionTask::FindingResource => {
                companion.resource_target = None;
                let found = locator.find_nearest(
                    companion.gather_anchor,
                    cfg.ai.resource_scan_range,
                    nodes.iter().map(|(entity, node_pos, node)| Candidate {
                        entity,
                        position: node_pos.0,
                        collected: node.has_been_collected,
                    }),
                    nav.0.as_ref(),
                );
                match found {
                    None => {
                        debug!("no reachable resource in range, falling back to idle");
                        events.bark(bark_scenarios::NOTHING_FOUND);
                        companion.commit_task(
                            CompanionTask::IdleAtSpawn,
                            false,
                            pos.0,
                            &mut events,
                        );
                    }
                    Some(entity) => {
                        companion.resource_target = Some(entity);
                        companion.commit_task(
                            CompanionTask::MovingToResource,
                            false,
                            pos.0,
                            &mut events,
                        );
                    }
                }
            }

            CompanionTask::MovingToResource => {
                let target = companion
                    .resource_target
                    .and_then(|entity| nodes.get(entity).ok())
                    .filter(|(_, _, node)| !node.has_been_collected)
                    .map(|(_, node_pos, node)| (node_pos.0, node.approach_points(node_pos.0)));

                let Some((_, (left, right))) = target else {
                    companion.commit_task(CompanionTask::FindingResource, false, pos.0, &mut events);
                    continue;
                };

                agent.is_stopped = false;
                let target_pos = if (left - pos.0).length() > (right - pos.0).length() {
                    right
                } else {
                    left
                };
                agent.stopping_distance = cfg.ai.collect_radius;
                agent.set_destination(target_pos);

                if has_arrived(&agent, pos.0) {
                    companion.commit_task(
                        CompanionTask::GatheringResource,
                        false,
                        pos.0,
                        &mut events,
                    );
                }
            }

            CompanionTask::GatheringResource => {
                let Some(target) = companion.resource_target else {
                    companion.commit_task(CompanionTask::FindingResource, false, pos.0, &mut events);
                    continue;
                };
                let Ok((_, _, mut node)) = nodes.get_mut(target) else {
                    companion.commit_task(CompanionTask::FindingResource, false, pos.0, &mut events);
                    continue;
                };
                if node.has_been_collected {
                    companion.commit_task(CompanionTask::FindingResource, false, pos.0, &mut events);
                    continue;
                }

                if companion.collect_timer > 0.0 {
                    companion.collect_timer -= dt;
                } else {
                    let damage = match node.kind {
                        ResourceKind::Tree => attrs.wood_chopping_damage.current(),
                        ResourceKind::Bush => attrs.foraging_damage.current(),
                        ResourceKind::Mineral => attrs.mining_damage.current(),
                    };
                    if !companion.has_played_collect_animation {
                        events.animation_bool(node.kind.gather_animation(), true);
                        companion.has_played_collect_animation = true;
                    }
                    if node.reduce_collect_hp(damage) {
                        events.emit(EventKind::ResourceCollected {
                            kind: node.kind.label().to_string(),
                        });
                    }
                    companion.collect_timer = cfg.ai.collect_interval;
                    // The swing landed; the next window re-triggers the
                    // animation.
                    companion.has_played_collect_animation = false;
                }
            }

            CompanionTask::Feed | CompanionTask::ProcessFuel => {
                agent.is_stopped = true;
                companion.interaction_elapsed += dt;
                if companion.interaction_elapsed >= cfg.ai.interact_duration {
                    if companion.current_task == CompanionTask::ProcessFuel {
                        // The processed flower becomes fuel for the player.
                        if let Ok((_, mut player_needs)) = player.get_single_mut() {
                            player_needs.modify_value(NeedKind::Fuel, -cfg.ai.process_fuel_amount);
                        }
                    }
                    companion.resume_after_interaction(pos.0, &mut events);
                    agent.is_stopped = false;
                }
            }

            CompanionTask::InDialogue | CompanionTask::BeingAttacked => {
                agent.is_stopped = true;
            }

            CompanionTask::Pat => {
                debug_assert!(false, "deprecated pat task reached execution");
                agent.is_stopped = true;
            }

            CompanionTask::MovingToPlace => {
                agent.is_stopped = false;
                agent.stopping_distance = cfg.movement.stopping_distance;
                agent.set_destination(companion.destination);
                if has_arrived(&agent, pos.0) {
                    companion.commit_task(CompanionTask::Idle, false, pos.0, &mut events);
                }
            }

            CompanionTask::Follow => {
                agent.is_stopped = false;
                if let Ok((player_pos, _)) = player.get_single() {
                    let mut dest = player_pos.0;
                    dest.x += cfg.ai.follow_offset[0];
                    dest.z += cfg.ai.follow_offset[1];
                    agent.stopping_distance = cfg.movement.stopping_distance;
                    agent.set_destination(dest);
                }
            }

            CompanionTask::MovingToShelter => {
                agent.is_stopped = false;
                agent.stopping_distance = cfg.ai.shelter_stopping_distance;
                agent.set_destination(companion.destination);
                if has_arrived(&agent, pos.0) {
                    companion.commit_task(CompanionTask::InShelter, false, pos.0, &mut events);
                    if let Some(shelter) = shelter.as_mut() {
                        shelter.has_companion_sheltered = true;
                    }
                    events.emit(EventKind::ShelterOccupied { occupied: true });
                }
            }

            CompanionTask::InShelter => {
                agent.is_stopped = true;
            }
        }
    }
}
