//! Enemy Detection Override
//!
//! Runs every tick before task execution: forces `BeingAttacked` when a
//! hostile closes in, attempts the shelter flee, and resumes the interrupted
//! task once the coast is clear. Also owns the wave bookkeeping (cleared
//! barks, auto-unshelter, chance bark on a hostile death).

use bevy_ecs::prelude::*;
use rand::Rng;
use tracing::debug;

use companion_events::{bark_scenarios, EventKind};

use crate::components::companion::{Companion, CompanionTask};
use crate::components::world::{EnemyAlert, Hostile, MoveAgent, Position, Shelter, Tuning, WaveState};
use crate::events::TickEvents;
use crate::SimRng;

pub fn detect_enemies(
    tuning: Res<Tuning>,
    mut events: ResMut<TickEvents>,
    mut rng: ResMut<SimRng>,
    mut wave: ResMut<WaveState>,
    alert: Option<Res<EnemyAlert>>,
    mut shelter: Option<ResMut<Shelter>>,
    hostiles: Query<&Position, With<Hostile>>,
    mut companions: Query<(&mut Position, &mut Companion, &mut MoveAgent), Without<Hostile>>,
) {
    let cfg = &tuning.0.ai;
    let hostile_count = hostiles.iter().count();
    let hostiles_present = hostile_count > 0;

    for (mut pos, mut companion, mut agent) in companions.iter_mut() {
        if companion.is_dying {
            continue;
        }

        if let Some(alert) = &alert {
            if alert.mid && !companion.alert_mid_barked {
                events.bark(bark_scenarios::ALERT_MID);
                companion.alert_mid_barked = true;
            }
            if alert.high && !companion.alert_high_barked {
                events.bark(bark_scenarios::ALERT_HIGH);
                companion.alert_high_barked = true;
            }
        }

        if hostiles_present && hostile_count < wave.last_hostile_count {
            // A hostile died mid-wave.
            if rng.0.gen::<f32>() < 0.3 {
                events.bark(bark_scenarios::MONSTER_DIED);
            }
        }

        if !hostiles_present && wave.last_hostile_count > 0 {
            companion.wave_cleared(&mut events);
            if let Some(shelter) = shelter.as_mut() {
                if shelter.has_companion_sheltered {
                    shelter.has_companion_sheltered = false;
                    events.emit(EventKind::ShelterOccupied { occupied: false });
                    pos.0 = shelter.entrance;
                    companion.try_request_task(
                        CompanionTask::Idle,
                        hostiles_present,
                        pos.0,
                        &mut events,
                    );
                }
            }
        }

        // The detection override never runs during a player move order.
        if companion.current_task == CompanionTask::MovingToPlace {
            continue;
        }

        // Logically off the playfield while sheltered.
        let in_range = companion.current_task != CompanionTask::InShelter
            && hostiles
                .iter()
                .any(|h| h.0.distance_squared(pos.0) <= cfg.detect_range_sq);

        if in_range
            && !matches!(
                companion.current_task,
                CompanionTask::BeingAttacked
                    | CompanionTask::MovingToPlace
                    | CompanionTask::MovingToShelter
            )
        {
            debug!("hostile in range, forcing combat stance");
            companion.is_being_attacked = true;
            companion.commit_task(CompanionTask::BeingAttacked, false, pos.0, &mut events);

            // Best effort: flee to an intact shelter. Failure leaves the
            // companion holding the combat stance.
            if let Some(shelter) = shelter.as_ref() {
                if !shelter.is_destroyed
                    && companion.try_request_task(
                        CompanionTask::MovingToShelter,
                        hostiles_present,
                        pos.0,
                        &mut events,
                    )
                {
                    companion.destination = shelter.entrance;
                    agent.set_destination(shelter.entrance);
                }
            }
        } else if !in_range && companion.current_task == CompanionTask::BeingAttacked {
            companion.is_being_attacked = false;
            // Feeding cannot silently resume after combat.
            let resume = if companion.previous_task == CompanionTask::Feed {
                CompanionTask::Idle
            } else {
                companion.previous_task
            };
            companion.commit_task(resume, false, pos.0, &mut events);
            agent.is_stopped = false;
        }
    }

    wave.last_hostile_count = hostile_count;
}
