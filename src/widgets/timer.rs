//! Elapsed-time widget and duration formatting.

use std::fmt;
use std::time::{Duration, Instant};

/// Formats a duration compactly: `450ms` below one second, otherwise whole units with zero
/// units omitted (`1h 5s`, `2m 30s`, `3d 4h`).
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    if total_ms < 1000 {
        return format!("{total_ms}ms");
    }

    let total_secs = duration.as_secs();
    let units = [
        (total_secs / 86_400, "d"),
        ((total_secs / 3_600) % 24, "h"),
        ((total_secs / 60) % 60, "m"),
        (total_secs % 60, "s"),
    ];
    units
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone)]
pub struct Timer {
    started: Instant,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Restarts the elapsed time from zero.
    pub fn reset(&mut self) {
        self.started = Instant::now();
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.elapsed()))
    }
}
