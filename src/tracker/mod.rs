//! Highlight tracking with timed expiry
//!
//! The tracker keeps the rectangles currently worth drawing around detected
//! barcodes. Every `update` replaces the visible set with the keys of the
//! current frame. Entries that stop being refreshed altogether (updates no
//! longer arrive) are removed by an expiry sweep running on a dedicated
//! worker thread.
//!
//! All mutation, from the frame thread and from the sweep worker, goes
//! through one `parking_lot::Mutex`. The worker sleeps on a `Condvar` until
//! the next sweep is due, so an idle tracker costs nothing.

mod observer;
mod state;

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex, MutexGuard, RwLock};
use tracing::{debug, trace, warn};

use crate::clock::{SharedClock, system_clock};
use crate::config::TrackerSettings;
use crate::models::Rect;

pub use observer::{ChannelObserver, FrameObserver};
pub use state::TrackedFrame;
use state::TrackerState;

struct Shared {
    state: Mutex<TrackerState>,
    wake: Condvar,
    clock: SharedClock,
    timeout_ms: u64,
    sweep_delay_ms: u64,
    observer: RwLock<Option<Arc<dyn FrameObserver>>>,
}

impl Shared {
    fn notify(&self, rects: &[Rect]) {
        let observer = self.observer.read().clone();
        if let Some(observer) = observer {
            observer.frames_changed(rects);
        }
    }

    /// Run one expiry pass at `now` under `state`, rescheduling as needed.
    /// Returns the new visible set if anything was removed.
    fn sweep_locked(&self, state: &mut TrackerState, now: u64) -> Option<Vec<Rect>> {
        let removed = state.remove_stale(now, self.timeout_ms);
        if state.entries.is_empty() {
            state.sweep_due_at = None;
            debug!("No more highlights to monitor, stopping expiry sweeps");
        } else {
            state.sweep_due_at = Some(now.saturating_add(self.sweep_delay_ms));
        }
        if removed > 0 {
            debug!(removed, remaining = state.entries.len(), "Removed stale highlights");
            Some(state.rects())
        } else {
            None
        }
    }
}

/// Time-windowed registry of highlighted barcode rectangles
pub struct FrameTracker {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl FrameTracker {
    /// Create a tracker on the wall clock with default timings
    pub fn new() -> Self {
        Self::with_clock(system_clock(), TrackerSettings::default())
    }

    /// Create a tracker reading time from `clock`
    ///
    /// Starts the sweep worker. If the worker thread cannot be spawned the
    /// tracker still works, but stale entries are only removed by explicit
    /// [`FrameTracker::expiry_sweep`] calls.
    pub fn with_clock(clock: SharedClock, settings: TrackerSettings) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(TrackerState::default()),
            wake: Condvar::new(),
            clock,
            timeout_ms: settings.frame_timeout.as_millis() as u64,
            sweep_delay_ms: (settings.sweep_delay.as_millis() as u64).max(1),
            observer: RwLock::new(None),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = match thread::Builder::new()
            .name("scan-frame-sweeper".to_string())
            .spawn(move || run_sweeper(worker_shared))
        {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(
                    error = %e,
                    "Failed to spawn highlight sweep worker; expiry falls back to explicit sweeps"
                );
                None
            }
        };

        Self {
            shared,
            worker: Mutex::new(worker),
        }
    }

    /// Register the observer notified after every change of the visible set
    pub fn set_observer<O: FrameObserver + 'static>(&self, observer: O) {
        *self.shared.observer.write() = Some(Arc::new(observer));
    }

    /// Remove the registered observer
    pub fn clear_observer(&self) {
        *self.shared.observer.write() = None;
    }

    /// Replace the visible set with this frame's highlights
    ///
    /// Keys present are refreshed to the current time; tracked keys missing
    /// from `frames` are dropped at once. Schedules an expiry sweep if
    /// highlights remain and none is pending.
    pub fn update(&self, frames: HashMap<String, Rect>) {
        let now = self.shared.clock.now_ms();
        let mut state = self.shared.state.lock();
        if state.shutdown {
            trace!("Highlight update after shutdown ignored");
            return;
        }

        let changed = state.apply_update(frames, now);
        if !state.entries.is_empty() && state.sweep_due_at.is_none() {
            state.sweep_due_at = Some(now.saturating_add(self.shared.sweep_delay_ms));
            self.shared.wake.notify_one();
            trace!(
                delay_ms = self.shared.sweep_delay_ms,
                frames = state.entries.len(),
                "Scheduled highlight expiry sweep"
            );
        }

        if changed {
            let rects = state.rects();
            MutexGuard::unlocked(&mut state, || self.shared.notify(&rects));
        }
    }

    /// Remove entries older than the timeout, right now
    ///
    /// The worker calls the same logic when a sweep falls due; calling it
    /// directly is useful with a manual clock.
    pub fn expiry_sweep(&self) {
        let now = self.shared.clock.now_ms();
        let mut state = self.shared.state.lock();
        if state.shutdown {
            return;
        }
        let changed = self.shared.sweep_locked(&mut state, now);
        self.shared.wake.notify_one();
        if let Some(rects) = changed {
            MutexGuard::unlocked(&mut state, || self.shared.notify(&rects));
        }
    }

    /// Drop every highlight and cancel the pending sweep
    pub fn clear_all(&self) {
        let mut state = self.shared.state.lock();
        if state.shutdown {
            return;
        }
        let count = state.entries.len();
        state.entries.clear();
        state.sweep_due_at = None;
        if count > 0 {
            debug!(count, "Cleared all highlights");
            MutexGuard::unlocked(&mut state, || self.shared.notify(&[]));
        }
    }

    /// Snapshot of the highlighted rectangles, in no particular order
    pub fn active_rects(&self) -> Vec<Rect> {
        self.shared.state.lock().rects()
    }

    /// Snapshot of the tracked entries, in no particular order
    pub fn entries(&self) -> Vec<TrackedFrame> {
        self.shared.state.lock().entries.values().cloned().collect()
    }

    /// Number of highlighted barcodes
    pub fn len(&self) -> usize {
        self.shared.state.lock().entries.len()
    }

    /// True when nothing is highlighted
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clock time at which the next expiry sweep is due, if one is pending
    pub fn pending_sweep_at(&self) -> Option<u64> {
        self.shared.state.lock().sweep_due_at
    }

    /// True once [`FrameTracker::shutdown`] has run
    pub fn is_shut_down(&self) -> bool {
        self.shared.state.lock().shutdown
    }

    /// Stop the sweep worker and make the tracker inert
    ///
    /// Idempotent. Later calls to `update`, `expiry_sweep` and `clear_all`
    /// do nothing and never schedule work.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.state.lock();
            if !state.shutdown {
                state.shutdown = true;
                state.sweep_due_at = None;
                debug!("Highlight tracker shut down");
            }
            self.shared.wake.notify_all();
        }

        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            // An observer running on the worker may call shutdown itself.
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                warn!("Highlight sweep worker panicked");
            }
        }
    }
}

impl Default for FrameTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FrameTracker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_sweeper(shared: Arc<Shared>) {
    let mut state = shared.state.lock();
    loop {
        if state.shutdown {
            break;
        }
        let Some(due) = state.sweep_due_at else {
            shared.wake.wait(&mut state);
            continue;
        };

        let now = shared.clock.now_ms();
        if now < due {
            shared
                .wake
                .wait_for(&mut state, Duration::from_millis(due - now));
            continue;
        }

        if let Some(rects) = shared.sweep_locked(&mut state, now) {
            MutexGuard::unlocked(&mut state, || shared.notify(&rects));
        }
    }
    trace!("Highlight sweep worker exiting");
}
