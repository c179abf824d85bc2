//! scan_gate - barcode scan decision pipeline
//!
//! Takes the barcodes a camera detector found in one frame and decides what
//! the application should see:
//!
//! - which candidates lie fully inside the focus area,
//! - which of them a selection strategy reports,
//! - which rectangles stay highlighted on screen,
//! - whether this frame's result may be emitted yet (debounce).
//!
//! Camera capture, decoding and rendering stay with the caller; this crate
//! only consumes candidates in one consistent view coordinate space.
//!
//! # Example
//! ```
//! use scan_gate::{BarcodeCandidate, BarcodeFormat, PipelineConfig, Rect, ScanPipeline};
//!
//! let pipeline = ScanPipeline::new(PipelineConfig {
//!     emission_interval_ms: 0,
//!     ..Default::default()
//! });
//! let frame = [BarcodeCandidate::new("123", BarcodeFormat::QrCode, Rect::new(0.0, 0.0, 40.0, 40.0))];
//! let decision = pipeline.process(&frame);
//! assert!(decision.emit);
//! assert_eq!(decision.reported[0].value.as_deref(), Some("123"));
//! pipeline.shutdown();
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Millisecond clocks (wall and manual)
pub mod clock;
/// Pipeline configuration and environment-tunable defaults
pub mod config;
/// Error types
pub mod error;
/// Scan event payload
pub mod event;
/// Emission debounce gate
pub mod gate;
/// Core data structures (Rect, BarcodeCandidate, BarcodeFormat, focus layout)
pub mod models;
/// Per-frame orchestration
pub mod pipeline;
/// Spatial filter and selection strategies
pub mod selection;
/// Session replay helpers
pub mod tools;
/// Highlight tracker with timed expiry
pub mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{FrameSettings, PipelineConfig, TrackerSettings};
pub use error::{ScanError, ScanResult};
pub use event::{ScanEvent, ScannedBarcode};
pub use gate::EmissionGate;
pub use models::{BarcodeCandidate, BarcodeFormat, FocusAreaLayout, FrameSize, Point, Rect};
pub use pipeline::{FrameDecision, ScanPipeline};
pub use selection::{FocusArea, SelectionStrategy, filter_by_focus, select};
pub use tracker::{ChannelObserver, FrameObserver, FrameTracker, TrackedFrame};
