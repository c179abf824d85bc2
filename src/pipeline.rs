//! Per-frame orchestration
//!
//! [`ScanPipeline`] composes the spatial filter, the selection strategy, the
//! highlight tracker and the emission gate. It is shared between the frame
//! analysis thread, which calls [`ScanPipeline::process`], and the UI layer,
//! which reconfigures, pauses and resumes it at any time.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::clock::{SharedClock, system_clock};
use crate::config::{
    FrameSettings, PipelineConfig, TrackerSettings, clamp_interval_ms, interval_secs_to_ms,
};
use crate::event::ScanEvent;
use crate::gate::EmissionGate;
use crate::models::{BarcodeCandidate, Rect};
use crate::selection::{FocusArea, SelectionStrategy, filter_by_focus, retain_within, select};
use crate::tracker::{FrameObserver, FrameTracker};

/// Outcome of one frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameDecision {
    /// Barcodes selected for reporting, in strategy order
    pub reported: Vec<BarcodeCandidate>,
    /// Rectangles to draw, independent of `emit`
    pub highlight_rects: Vec<Rect>,
    /// Whether `reported` should be delivered to the application now
    pub emit: bool,
    /// Clock time the frame was processed at
    pub timestamp: u64,
}

impl FrameDecision {
    /// Event payload for this frame, present only when it should be emitted
    pub fn event(&self) -> Option<ScanEvent> {
        self.emit
            .then(|| ScanEvent::from_candidates(&self.reported, self.timestamp))
    }
}

/// Barcode scan decision pipeline for one camera stream
pub struct ScanPipeline {
    config: RwLock<PipelineConfig>,
    gate: Mutex<EmissionGate>,
    paused: AtomicBool,
    tracker: FrameTracker,
    clock: SharedClock,
}

impl ScanPipeline {
    /// Create a pipeline on the wall clock
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_clock(config, system_clock(), TrackerSettings::default())
    }

    /// Create a pipeline reading time from `clock`
    pub fn with_clock(
        config: PipelineConfig,
        clock: SharedClock,
        tracker: TrackerSettings,
    ) -> Self {
        let gate = EmissionGate::new(config.emission_interval_ms);
        Self {
            tracker: FrameTracker::with_clock(clock.clone(), tracker),
            config: RwLock::new(config),
            gate: Mutex::new(gate),
            paused: AtomicBool::new(false),
            clock,
        }
    }

    /// Decide what to report and highlight for one frame of candidates
    pub fn process(&self, candidates: &[BarcodeCandidate]) -> FrameDecision {
        let now = self.clock.now_ms();
        if self.is_paused() {
            trace!(candidates = candidates.len(), "Frame discarded while paused");
            return FrameDecision {
                reported: Vec::new(),
                highlight_rects: self.tracker.active_rects(),
                emit: false,
                timestamp: now,
            };
        }

        let config = self.config.read().clone();

        let filtered = filter_by_focus(candidates, &config.focus_area);
        let reported = select(&filtered, config.strategy);

        self.update_highlights(candidates, &config);

        // `paused` only changes under the gate lock, so a pause that landed
        // mid-frame is seen here and undoes this frame's highlights.
        let emit = {
            let mut gate = self.gate.lock();
            if self.is_paused() {
                None
            } else {
                Some(!reported.is_empty() && gate.should_emit(now))
            }
        };
        let Some(emit) = emit else {
            self.tracker.clear_all();
            trace!(candidates = candidates.len(), "Frame dropped by concurrent pause");
            return FrameDecision {
                reported: Vec::new(),
                highlight_rects: self.tracker.active_rects(),
                emit: false,
                timestamp: now,
            };
        };

        trace!(
            candidates = candidates.len(),
            filtered = filtered.len(),
            reported = reported.len(),
            emit,
            "Processed frame"
        );

        FrameDecision {
            reported,
            highlight_rects: self.tracker.active_rects(),
            emit,
            timestamp: now,
        }
    }

    fn update_highlights(&self, candidates: &[BarcodeCandidate], config: &PipelineConfig) {
        if !config.frames.enabled {
            self.tracker.clear_all();
            return;
        }

        let restricted;
        let source: &[BarcodeCandidate] = match config.focus_area.rect.as_ref() {
            Some(rect) if config.frames.only_within_focus_area => {
                restricted = retain_within(candidates, rect);
                &restricted
            }
            _ => candidates,
        };

        let frames: HashMap<String, Rect> = source
            .iter()
            .filter_map(|c| c.highlight_key().map(|key| (key.to_string(), c.rect)))
            .collect();
        self.tracker.update(frames);
    }

    /// Stop reporting; clears highlights and resets the emission gate
    pub fn pause(&self) {
        {
            let mut gate = self.gate.lock();
            self.paused.store(true, Ordering::SeqCst);
            gate.reset();
        }
        self.tracker.clear_all();
        debug!("Scanning paused");
    }

    /// Resume reporting; the first detection afterwards emits unconditionally
    pub fn resume(&self) {
        let mut gate = self.gate.lock();
        self.paused.store(false, Ordering::SeqCst);
        gate.reset();
        drop(gate);
        debug!("Scanning resumed");
    }

    /// Pause or resume
    pub fn set_paused(&self, paused: bool) {
        if paused { self.pause() } else { self.resume() }
    }

    /// True while paused
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Snapshot of the active configuration
    pub fn config(&self) -> PipelineConfig {
        self.config.read().clone()
    }

    /// Replace the whole configuration
    pub fn set_config(&self, config: PipelineConfig) {
        self.gate.lock().set_min_interval_ms(config.emission_interval_ms);
        *self.config.write() = config;
        debug!("Pipeline configuration replaced");
    }

    /// Replace the focus area
    pub fn set_focus_area(&self, focus_area: FocusArea) {
        self.config.write().focus_area = focus_area;
        debug!(enabled = focus_area.enabled, rect = ?focus_area.rect, "Focus area set");
    }

    /// Replace the selection strategy
    pub fn set_strategy(&self, strategy: SelectionStrategy) {
        self.config.write().strategy = strategy;
        debug!(%strategy, "Scan strategy set");
    }

    /// Set the strategy by name; unknown names select `ALL`
    pub fn set_strategy_name(&self, name: &str) {
        self.set_strategy(SelectionStrategy::from_name_lossy(name));
    }

    /// Replace the highlight display settings
    pub fn set_frame_settings(&self, frames: FrameSettings) {
        self.config.write().frames = frames;
        if !frames.enabled {
            self.tracker.clear_all();
        }
        debug!(
            enabled = frames.enabled,
            only_within_focus_area = frames.only_within_focus_area,
            "Highlight settings set"
        );
    }

    /// Set the minimum emission interval; negative values clamp to zero
    pub fn set_emission_interval_ms(&self, ms: i64) {
        let ms = clamp_interval_ms(ms);
        self.config.write().emission_interval_ms = ms;
        self.gate.lock().set_min_interval_ms(ms);
        debug!(interval_ms = ms, "Emission interval set");
    }

    /// Set the minimum emission interval in seconds; negative values clamp to zero
    pub fn set_emission_interval_secs(&self, secs: f64) {
        let ms = interval_secs_to_ms(secs);
        self.config.write().emission_interval_ms = ms;
        self.gate.lock().set_min_interval_ms(ms);
        debug!(interval_ms = ms, "Emission interval set");
    }

    /// Register the observer notified when highlights change
    pub fn set_frame_observer<O: FrameObserver + 'static>(&self, observer: O) {
        self.tracker.set_observer(observer);
    }

    /// Highlight tracker backing this pipeline
    pub fn tracker(&self) -> &FrameTracker {
        &self.tracker
    }

    /// Stop background work; safe to call more than once
    pub fn shutdown(&self) {
        self.tracker.shutdown();
    }
}

impl Default for ScanPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::models::BarcodeFormat;
    use std::sync::atomic::AtomicU64;
    use std::sync::{Arc, OnceLock, Weak};

    fn candidate(value: &str, l: f32, t: f32, r: f32, b: f32) -> BarcodeCandidate {
        BarcodeCandidate::new(value, BarcodeFormat::QrCode, Rect::new(l, t, r, b))
    }

    fn pipeline(config: PipelineConfig) -> (Arc<ManualClock>, ScanPipeline) {
        let clock = ManualClock::new(1_000);
        let pipeline = ScanPipeline::with_clock(config, clock.clone(), TrackerSettings::default());
        (clock, pipeline)
    }

    #[test]
    fn paused_pipeline_discards_frames() {
        let (_clock, pipeline) = pipeline(PipelineConfig {
            emission_interval_ms: 0,
            ..Default::default()
        });
        pipeline.pause();
        let decision = pipeline.process(&[candidate("123", 0.0, 0.0, 10.0, 10.0)]);
        assert!(decision.reported.is_empty());
        assert!(!decision.emit);
        assert!(decision.event().is_none());
    }

    #[test]
    fn empty_selection_never_touches_gate() {
        let (clock, pipeline) = pipeline(PipelineConfig {
            emission_interval_ms: 500,
            focus_area: FocusArea::enabled(Rect::new(0.0, 0.0, 100.0, 100.0)),
            ..Default::default()
        });
        let outside = candidate("out", 200.0, 200.0, 220.0, 220.0);
        let inside = candidate("in", 10.0, 10.0, 20.0, 20.0);

        assert!(!pipeline.process(&[outside]).emit);
        clock.advance(10);
        assert!(pipeline.process(&[inside.clone()]).emit);
        clock.advance(10);
        assert!(!pipeline.process(&[inside]).emit);
    }

    #[test]
    fn disabling_frames_clears_highlights() {
        let (_clock, pipeline) = pipeline(PipelineConfig {
            frames: FrameSettings {
                enabled: true,
                only_within_focus_area: false,
            },
            ..Default::default()
        });
        let decision = pipeline.process(&[candidate("a", 0.0, 0.0, 5.0, 5.0)]);
        assert_eq!(decision.highlight_rects.len(), 1);

        pipeline.set_frame_settings(FrameSettings::default());
        assert!(pipeline.tracker().is_empty());
        let decision = pipeline.process(&[candidate("a", 0.0, 0.0, 5.0, 5.0)]);
        assert!(decision.highlight_rects.is_empty());
    }

    /// Clock that pauses the pipeline on its second read, which lands inside
    /// the highlight update after the frame passed its paused check.
    struct PausingClock {
        reads: AtomicU64,
        pipeline: OnceLock<Weak<ScanPipeline>>,
    }

    impl Clock for PausingClock {
        fn now_ms(&self) -> u64 {
            let read = self.reads.fetch_add(1, Ordering::SeqCst);
            if read == 1 {
                if let Some(pipeline) = self.pipeline.get().and_then(Weak::upgrade) {
                    pipeline.pause();
                }
            }
            1_000
        }
    }

    #[test]
    fn pause_during_frame_suppresses_highlights_and_emission() {
        let clock = Arc::new(PausingClock {
            reads: AtomicU64::new(0),
            pipeline: OnceLock::new(),
        });
        let pipeline = Arc::new(ScanPipeline::with_clock(
            PipelineConfig {
                frames: FrameSettings {
                    enabled: true,
                    only_within_focus_area: false,
                },
                emission_interval_ms: 0,
                ..Default::default()
            },
            clock.clone(),
            TrackerSettings::default(),
        ));
        let _ = clock.pipeline.set(Arc::downgrade(&pipeline));

        let decision = pipeline.process(&[candidate("123", 0.0, 0.0, 10.0, 10.0)]);
        assert!(pipeline.is_paused());
        assert!(!decision.emit);
        assert!(decision.reported.is_empty());
        assert!(decision.highlight_rects.is_empty());
        assert!(pipeline.tracker().is_empty());
        pipeline.shutdown();
    }

    #[test]
    fn duplicate_value_keeps_last_rect() {
        let (_clock, pipeline) = pipeline(PipelineConfig {
            frames: FrameSettings {
                enabled: true,
                only_within_focus_area: false,
            },
            ..Default::default()
        });
        let second = Rect::new(50.0, 50.0, 70.0, 70.0);
        let decision = pipeline.process(&[
            candidate("X", 0.0, 0.0, 10.0, 10.0),
            candidate("X", 50.0, 50.0, 70.0, 70.0),
        ]);
        assert_eq!(decision.highlight_rects, vec![second]);
        assert_eq!(decision.reported.len(), 2);
    }

    #[test]
    fn interval_setters_clamp_negative_values() {
        let (_clock, pipeline) = pipeline(PipelineConfig::default());
        pipeline.set_emission_interval_ms(-5);
        assert_eq!(pipeline.config().emission_interval_ms, 0);
        pipeline.set_emission_interval_secs(1.25);
        assert_eq!(pipeline.config().emission_interval_ms, 1250);
        pipeline.set_emission_interval_secs(-3.0);
        assert_eq!(pipeline.config().emission_interval_ms, 0);
    }

    #[test]
    fn unknown_strategy_name_falls_back_to_all() {
        let (_clock, pipeline) = pipeline(PipelineConfig::default());
        pipeline.set_strategy_name("ONE");
        assert_eq!(pipeline.config().strategy, SelectionStrategy::One);
        pipeline.set_strategy_name("NEAREST");
        assert_eq!(pipeline.config().strategy, SelectionStrategy::All);
    }
}
