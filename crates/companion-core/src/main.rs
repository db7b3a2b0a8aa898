//! Companion Behavior Simulation
//!
//! Headless demo driver: spawns the companion, the player, a resource field,
//! and a shelter, then runs a scripted day — a gather order, a hostile wave,
//! the all-clear — while logging every outbound event as JSONL.

use bevy_ecs::prelude::*;
use clap::Parser;
use glam::Vec3;
use std::fs;
use std::path::PathBuf;

use companion_core::components::{
    Companion, CompanionTask, Consumable, ConsumableEffect, EnemyAlert, HeldSlots, ItemSlot,
    NeedKind, NeedSet, WorldClock,
};
use companion_core::config::Config;
use companion_core::events::{EventLogger, TickEvents};
use companion_core::setup;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "companion_sim")]
#[command(about = "Headless companion-AI behavior simulation")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate (0 = use the tuning default)
    #[arg(long, default_value_t = 0)]
    ticks: u64,

    /// Tuning file path
    #[arg(long, default_value = "tuning.toml")]
    tuning: PathBuf,

    /// Event log output path
    #[arg(long, default_value = "output/companion_events.jsonl")]
    event_log: PathBuf,

    /// Print each logged event to stdout
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let config = Config::load(&args.tuning).unwrap_or_else(|e| {
        eprintln!("Warning: could not load {}: {}. Using defaults.", args.tuning.display(), e);
        Config::default()
    });
    let ticks = if args.ticks > 0 {
        args.ticks
    } else {
        config.simulation.default_ticks
    };

    println!("Companion Behavior Simulation");
    println!("=============================");
    println!("Seed: {}", args.seed);
    println!("Ticks: {}", ticks);
    println!();

    if let Some(parent) = args.event_log.parent() {
        fs::create_dir_all(parent).unwrap_or_else(|e| {
            eprintln!("Warning: could not create output directory: {}", e);
        });
    }
    let mut logger = EventLogger::new(&args.event_log).unwrap_or_else(|e| {
        eprintln!("Warning: could not open event log: {}. Discarding events.", e);
        EventLogger::null()
    });

    // World setup
    let mut world = World::new();
    setup::init_resources(&mut world, config, args.seed);
    let companion = setup::spawn_companion(&mut world, Vec3::ZERO);
    setup::spawn_player(&mut world, Vec3::new(2.0, 0.0, 2.0));
    setup::spawn_shelter(&mut world, Vec3::new(-8.0, 0.0, -8.0));
    setup::scatter_resources(&mut world, 12, 5.0, 25.0);

    // A few consumables so auto-consume has something to reach for.
    world.insert_resource(HeldSlots::new(vec![
        ItemSlot::stack(
            Consumable {
                effect: ConsumableEffect::RecoverHunger,
                value: 20.0,
                is_processed: true,
                usable_by_player: false,
            },
            3,
        ),
        ItemSlot::stack(
            Consumable {
                effect: ConsumableEffect::RecoverSanity,
                value: 15.0,
                is_processed: true,
                usable_by_player: false,
            },
            2,
        ),
    ]));
    world.get_mut::<Companion>(companion).unwrap().auto_consume_enabled = true;

    let mut schedule = setup::build_schedule();

    // Scripted beats, scaled to the run length.
    let gather_at = ticks / 10;
    let wave_at = ticks * 4 / 10;
    let clear_at = ticks * 7 / 10;

    for tick in 0..ticks {
        world.resource_mut::<WorldClock>().advance();

        if tick == gather_at {
            let accepted = setup::request_task(&mut world, CompanionTask::FindingResource);
            println!("[tick {}] gather order {}", tick, if accepted { "accepted" } else { "rejected" });
        }
        if tick == wave_at {
            println!("[tick {}] hostile wave spawns", tick);
            for offset in [
                Vec3::new(4.0, 0.0, 1.0),
                Vec3::new(-3.0, 0.0, 3.0),
                Vec3::new(1.0, 0.0, -4.0),
            ] {
                setup::spawn_hostile(&mut world, offset);
            }
            world.resource_mut::<EnemyAlert>().mid = true;
        }
        if tick == wave_at + 50 {
            world.resource_mut::<EnemyAlert>().high = true;
        }
        if tick == wave_at + 20 {
            let landed = setup::strike_companion(&mut world, Vec3::new(4.0, 0.0, 1.0), 8.0);
            println!("[tick {}] companion struck ({})", tick, if landed { "hit" } else { "absorbed" });
        }
        if tick == clear_at {
            println!("[tick {}] hostile wave cleared", tick);
            setup::despawn_hostiles(&mut world);
        }

        schedule.run(&mut world);

        let drained = world.resource_mut::<TickEvents>().drain();
        if args.verbose {
            for event in &drained {
                println!("  {:?}", event.kind);
            }
        }
        if let Err(e) = logger.log_batch(&drained) {
            eprintln!("Warning: event logging failed: {}", e);
        }
    }

    logger.flush().ok();

    // Run summary
    let task = world.get::<Companion>(companion).unwrap().current_task;
    let needs = world.get::<NeedSet>(companion).unwrap();
    println!();
    println!("Run complete");
    println!("  final task: {}", task.label());
    for kind in [NeedKind::Health, NeedKind::Hunger, NeedKind::Sanity] {
        if let Some(need) = needs.get(kind) {
            println!("  {}: {:.1}/{:.1}", kind.label(), need.value(), need.max_value());
        }
    }
    if let Some(snapshot) = needs.capture_snapshot() {
        println!("  save pairs: {:?}", snapshot.to_pairs());
    }
    println!("  events logged: {}", logger.event_count());
}
