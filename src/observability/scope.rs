//! ObservationScope for begin/complete logging
//!
//! - Logs `begin` on creation
//! - Logs `complete` or `failed` when closed
//! - Warns on drop if never closed

use std::time::Instant;

use tracing::{error, info, warn};

/// Logs the lifecycle of one named unit of work
///
/// ```ignore
/// let scope = ObservationScope::new("validate_edits").with_field("session", id);
/// // ... do work ...
/// scope.complete();
/// ```
pub struct ObservationScope {
    name: &'static str,
    fields: Vec<(&'static str, String)>,
    timer: Timer,
    closed: bool,
}

impl ObservationScope {
    /// Opens a scope and logs `begin`
    pub fn new(name: &'static str) -> Self {
        info!(scope = name, "begin");
        Self {
            name,
            fields: Vec::new(),
            timer: Timer::new(),
            closed: false,
        }
    }

    /// Attaches a field repeated on the closing log line
    pub fn with_field(mut self, key: &'static str, value: impl ToString) -> Self {
        self.fields.push((key, value.to_string()));
        self
    }

    fn rendered_fields(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Closes the scope successfully
    pub fn complete(mut self) {
        self.closed = true;
        info!(
            scope = self.name,
            elapsed_ms = self.timer.elapsed_ms(),
            fields = %self.rendered_fields(),
            "complete"
        );
    }

    /// Closes the scope with a failure reason
    pub fn fail(mut self, reason: &str) {
        self.closed = true;
        error!(
            scope = self.name,
            elapsed_ms = self.timer.elapsed_ms(),
            fields = %self.rendered_fields(),
            reason,
            "failed"
        );
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.closed {
            warn!(scope = self.name, "scope dropped without completion");
        }
    }
}

/// Elapsed wall time since creation
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_complete() {
        let scope = ObservationScope::new("TEST").with_field("edits", 3);
        assert!(!scope.is_closed());
        scope.complete();
    }

    #[test]
    fn test_scope_fail() {
        let scope = ObservationScope::new("TEST");
        scope.fail("something went wrong");
    }

    #[test]
    fn test_scope_drop_without_complete() {
        // Logs a warning, never panics
        let scope = ObservationScope::new("TEST");
        drop(scope);
    }

    #[test]
    fn test_timer() {
        let timer = Timer::new();
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(timer.elapsed_ms() >= 10);
    }
}
