//! Event Logger
//!
//! Append-only JSONL event logging.

use bevy_ecs::prelude::*;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use companion_events::CompanionEvent;

/// Resource for logging events to a JSONL file
#[derive(Resource)]
pub struct EventLogger {
    writer: Option<BufWriter<File>>,
    event_count: u64,
}

impl EventLogger {
    /// Create a new event logger writing to the specified path
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            event_count: 0,
        })
    }

    /// Create a logger that discards events (for testing)
    pub fn null() -> Self {
        Self {
            writer: None,
            event_count: 0,
        }
    }

    /// Get the current event count
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Log an event to the file
    pub fn log(&mut self, event: &CompanionEvent) -> std::io::Result<()> {
        self.event_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(event)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    /// Log multiple events
    pub fn log_batch(&mut self, events: &[CompanionEvent]) -> std::io::Result<()> {
        for event in events {
            self.log(event)?;
        }
        Ok(())
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("failed to flush event logger: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use companion_events::{EventKind, TickStamp};
    use std::io::BufRead;

    #[test]
    fn test_event_logging() {
        let dir = std::env::temp_dir();
        let test_path = dir.join("companion_test_events.jsonl");

        let mut logger = EventLogger::new(&test_path).unwrap();
        let event = CompanionEvent::new(
            "evt_00000000",
            TickStamp::new(3, 0.3),
            EventKind::Bark { id: 17 },
        );
        logger.log(&event).unwrap();
        logger.flush().unwrap();

        let file = File::open(&test_path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 1);

        let parsed: CompanionEvent = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed.event_id, "evt_00000000");
        assert_eq!(parsed.kind, EventKind::Bark { id: 17 });

        std::fs::remove_file(&test_path).ok();
    }

    #[test]
    fn test_null_logger_counts_without_writing() {
        let mut logger = EventLogger::null();
        let event = CompanionEvent::new(
            "evt_00000000",
            TickStamp::start(),
            EventKind::CompanionDied,
        );
        logger.log(&event).unwrap();
        assert_eq!(logger.event_count(), 1);
    }
}
