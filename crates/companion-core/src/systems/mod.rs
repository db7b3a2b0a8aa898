//! Per-tick systems, listed in schedule order: needs tick, edge reactions,
//! enemy detection, task execution, auto-consume, movement.

pub mod consume;
pub mod detection;
pub mod movement;
pub mod needs;
pub mod status;
pub mod task;

pub use consume::auto_consume;
pub use detection::detect_enemies;
pub use movement::{advance_agents, sync_upgraded_speed};
pub use needs::{forward_actor_events, tick_needs};
pub use status::{apply_need_edges, kill_companion};
pub use task::execute_task;
