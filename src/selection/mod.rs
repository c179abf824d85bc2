//! Per-frame candidate reduction
//!
//! - Spatial filtering against the focus area (full containment)
//! - Selection strategies for frames with several barcodes

/// Focus-area containment filter
pub mod focus;
/// ONE / ALL / BIGGEST / SORT_BY_BIGGEST selection
pub mod strategy;

pub use focus::{FocusArea, filter_by_focus, retain_within};
pub use strategy::{SelectionStrategy, select};
