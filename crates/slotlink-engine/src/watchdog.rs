use std::sync::atomic::{AtomicBool, Ordering};

/// Verdict of one watchdog check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// The runtime loop made progress since the last check.
    Alive,
    /// No runtime pass completed since the last check; the loop is
    /// considered stuck. Escalation (platform reset) is the caller's job.
    Starved,
}

/// Liveness monitor over the rx/tx pipelines.
///
/// The pipelines set the pet flag on every successful pass; the check swaps
/// it out on its own cadence. Checkable without taking the engine lock.
#[derive(Debug, Default)]
pub struct Watchdog {
    petted: AtomicBool,
}

impl Watchdog {
    pub fn new() -> Self {
        Self {
            petted: AtomicBool::new(false),
        }
    }

    /// Called by the pipelines at the end of each successful pass.
    pub fn pet(&self) {
        self.petted.store(true, Ordering::Release);
    }

    /// Consume the pet flag and report liveness.
    pub fn check(&self) -> Liveness {
        if self.petted.swap(false, Ordering::AcqRel) {
            Liveness::Alive
        } else {
            Liveness::Starved
        }
    }
}
