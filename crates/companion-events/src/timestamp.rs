//! Simulation Timestamp Types
//!
//! A point in simulation time: a monotonic tick counter plus elapsed
//! game-seconds, so downstream consumers can correlate events with both.
//!
//! # Example
//!
//! ```
//! use companion_events::TickStamp;
//!
//! let ts = TickStamp::new(100, 10.0);
//! assert_eq!(ts.tick, 100);
//! assert_eq!(ts.seconds, 10.0);
//! ```

use serde::{Deserialize, Serialize};

/// A point in simulation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickStamp {
    /// Monotonically increasing simulation tick.
    pub tick: u64,
    /// Elapsed game-time in seconds since the run started.
    pub seconds: f32,
}

impl TickStamp {
    /// Creates a new TickStamp.
    pub fn new(tick: u64, seconds: f32) -> Self {
        Self { tick, seconds }
    }

    /// Creates a timestamp for the start of the simulation.
    pub fn start() -> Self {
        Self {
            tick: 0,
            seconds: 0.0,
        }
    }

    /// Advances by one tick of `dt` game-seconds.
    pub fn advance(&mut self, dt: f32) {
        self.tick += 1;
        self.seconds += dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_stamp_start() {
        let ts = TickStamp::start();
        assert_eq!(ts.tick, 0);
        assert_eq!(ts.seconds, 0.0);
    }

    #[test]
    fn test_tick_stamp_advance() {
        let mut ts = TickStamp::start();
        ts.advance(0.1);
        ts.advance(0.1);
        assert_eq!(ts.tick, 2);
        assert!((ts.seconds - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_tick_stamp_serialization() {
        let ts = TickStamp::new(42, 4.2);
        let json = serde_json::to_string(&ts).unwrap();
        let parsed: TickStamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, parsed);
    }
}
