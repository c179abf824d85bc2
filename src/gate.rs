//! Emission debounce
//!
//! The gate decides whether a non-empty selection may be reported now. It
//! keeps a single timestamp; `None` means nothing was emitted since the last
//! reset and the next check always passes.

use tracing::trace;

/// Time-based emission gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmissionGate {
    last_emitted_at: Option<u64>,
    min_interval_ms: u64,
}

impl EmissionGate {
    /// Create a gate with the given minimum interval between emissions
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            last_emitted_at: None,
            min_interval_ms,
        }
    }

    /// Check whether an emission at `now_ms` is allowed, recording it if so
    ///
    /// A clock that moved backwards counts as zero elapsed time.
    pub fn should_emit(&mut self, now_ms: u64) -> bool {
        let allowed = match self.last_emitted_at {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.min_interval_ms,
        };
        if allowed {
            self.last_emitted_at = Some(now_ms);
        } else {
            trace!(
                now_ms,
                last_emitted_at = self.last_emitted_at,
                min_interval_ms = self.min_interval_ms,
                "Emission debounced"
            );
        }
        allowed
    }

    /// Forget the last emission so the next check passes unconditionally
    pub fn reset(&mut self) {
        self.last_emitted_at = None;
    }

    /// Change the minimum interval; the last emission time is kept
    pub fn set_min_interval_ms(&mut self, min_interval_ms: u64) {
        self.min_interval_ms = min_interval_ms;
    }

    /// Minimum interval between emissions
    pub fn min_interval_ms(&self) -> u64 {
        self.min_interval_ms
    }

    /// Time of the last allowed emission since the last reset
    pub fn last_emitted_at(&self) -> Option<u64> {
        self.last_emitted_at
    }
}
