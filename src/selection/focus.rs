use serde::{Deserialize, Serialize};

use crate::models::{BarcodeCandidate, Rect};

/// Region that restricts which candidates are scanned
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusArea {
    /// Whether scanning is restricted to `rect`
    pub enabled: bool,
    /// Focus rectangle in view coordinates
    pub rect: Option<Rect>,
}

impl FocusArea {
    /// Focus area that filters nothing
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Enabled focus area over `rect`
    pub fn enabled(rect: Rect) -> Self {
        Self {
            enabled: true,
            rect: Some(rect),
        }
    }

    /// The rectangle to filter against, if filtering applies
    pub fn active_rect(&self) -> Option<&Rect> {
        if self.enabled { self.rect.as_ref() } else { None }
    }
}

/// Keep only candidates fully inside the active focus rectangle
///
/// Returns the input unchanged when the focus area is disabled or has no
/// rectangle. Input order is preserved.
pub fn filter_by_focus(
    candidates: &[BarcodeCandidate],
    focus: &FocusArea,
) -> Vec<BarcodeCandidate> {
    match focus.active_rect() {
        Some(rect) => retain_within(candidates, rect),
        None => candidates.to_vec(),
    }
}

/// Keep only candidates fully inside `rect`
pub fn retain_within(candidates: &[BarcodeCandidate], rect: &Rect) -> Vec<BarcodeCandidate> {
    candidates
        .iter()
        .filter(|c| rect.contains(&c.rect))
        .cloned()
        .collect()
}
