//! Validation counters
//!
//! - Counters only, monotonic
//! - Relaxed atomics; exact per process, no ordering between counters

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters shared by the sessions of one validator
#[derive(Debug, Default)]
pub struct ValidationMetrics {
    /// Edits that passed every requested check
    edits_accepted: AtomicU64,
    /// Edits rejected by any check
    edits_rejected: AtomicU64,
    /// Edit-mode engine runs
    syntax_passes: AtomicU64,
    /// Full-mode engine runs
    semantic_passes: AtomicU64,
    /// Custom hooks dispatched
    hooks_invoked: AtomicU64,
    /// Custom hooks returning a failure
    hooks_failed: AtomicU64,
    /// Dependent data documents cached into sessions
    dependent_data_added: AtomicU64,
}

impl ValidationMetrics {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_edits_accepted(&self) {
        self.edits_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_edits_rejected(&self) {
        self.edits_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_syntax_passes(&self) {
        self.syntax_passes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_semantic_passes(&self) {
        self.semantic_passes.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one hook dispatch and whether it failed
    pub fn record_hook(&self, failed: bool) {
        self.hooks_invoked.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.hooks_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn increment_dependent_data(&self) {
        self.dependent_data_added.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            edits_accepted: self.edits_accepted.load(Ordering::Relaxed),
            edits_rejected: self.edits_rejected.load(Ordering::Relaxed),
            syntax_passes: self.syntax_passes.load(Ordering::Relaxed),
            semantic_passes: self.semantic_passes.load(Ordering::Relaxed),
            hooks_invoked: self.hooks_invoked.load(Ordering::Relaxed),
            hooks_failed: self.hooks_failed.load(Ordering::Relaxed),
            dependent_data_added: self.dependent_data_added.load(Ordering::Relaxed),
        }
    }
}

/// Serializable copy of [`ValidationMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub edits_accepted: u64,
    pub edits_rejected: u64,
    pub syntax_passes: u64,
    pub semantic_passes: u64,
    pub hooks_invoked: u64,
    pub hooks_failed: u64,
    pub dependent_data_added: u64,
}

impl MetricsSnapshot {
    /// Total edits seen
    pub fn edits_total(&self) -> u64 {
        self.edits_accepted + self.edits_rejected
    }
}
