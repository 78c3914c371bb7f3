//! Threat monitor.
//!
//! Two-state cycle over [`SecurityMetrics::neural_defense_status`]:
//! `OPTIMAL` goes `REACTIVE` when a poll detects intrusions, and back to
//! `OPTIMAL` once the dwell elapses. Every activation carries an epoch;
//! a revert only lands if no newer activation has happened since, so a
//! stale revert cannot cut a fresh `REACTIVE` window short.
//!
//! [`ThreatMonitor`] is the pure state machine. [`MonitorHandle`] drives it
//! on a tokio timer against shared session state.

mod task;

pub use task::MonitorHandle;

use rap_model::{DefenseStatus, SecurityMetrics};
use tracing::{debug, info};

/// Result of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing detected, metrics untouched
    Quiet,
    /// Intrusions detected; a revert for `epoch` is due after the dwell
    Reactive { detected: u32, epoch: u64 },
}

/// Defense status state machine.
#[derive(Debug, Default)]
pub struct ThreatMonitor {
    /// Monotonic activation counter
    epoch: u64,
    /// Epoch whose revert is still outstanding
    pending: Option<u64>,
}

impl ThreatMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Epoch of the most recent activation.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Epoch awaiting revert, if any.
    pub fn pending(&self) -> Option<u64> {
        self.pending
    }

    /// Apply one poll result.
    pub fn poll(&mut self, metrics: &mut SecurityMetrics, detected: u32) -> PollOutcome {
        if detected == 0 {
            debug!("Threat poll quiet");
            return PollOutcome::Quiet;
        }

        self.epoch += 1;
        self.pending = Some(self.epoch);

        metrics.intrusion_attempts += u64::from(detected);
        metrics.neural_defense_status = DefenseStatus::Reactive;

        info!(
            detected,
            total = metrics.intrusion_attempts,
            epoch = self.epoch,
            "Intrusions detected, defense reactive"
        );

        PollOutcome::Reactive {
            detected,
            epoch: self.epoch,
        }
    }

    /// Return to `OPTIMAL` if `epoch` is still the latest activation.
    /// Returns whether the revert applied.
    pub fn revert(&mut self, metrics: &mut SecurityMetrics, epoch: u64) -> bool {
        if self.pending != Some(epoch) {
            debug!(epoch, current = self.epoch, "Stale revert dropped");
            return false;
        }

        self.pending = None;
        metrics.neural_defense_status = DefenseStatus::Optimal;
        debug!(epoch, "Defense back to optimal");
        true
    }

    /// Drop any outstanding revert.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
