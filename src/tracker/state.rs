use std::collections::HashMap;

use crate::models::Rect;

/// A highlighted barcode and when it was last detected
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedFrame {
    /// Barcode value the highlight belongs to
    pub key: String,
    /// Most recent bounding box
    pub rect: Rect,
    /// Clock time of the last update that contained `key`
    pub last_seen_at: u64,
}

/// Mutable tracker state; only ever touched under the tracker lock
#[derive(Debug, Default)]
pub(crate) struct TrackerState {
    pub(crate) entries: HashMap<String, TrackedFrame>,
    pub(crate) sweep_due_at: Option<u64>,
    pub(crate) shutdown: bool,
}

impl TrackerState {
    /// Replace the visible set with `frames`; returns true if it changed
    pub(crate) fn apply_update(&mut self, frames: HashMap<String, Rect>, now: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|key, _| frames.contains_key(key));
        let mut changed = self.entries.len() != before;

        for (key, rect) in frames {
            match self.entries.get_mut(&key) {
                Some(entry) => {
                    changed |= entry.rect != rect;
                    entry.rect = rect;
                    entry.last_seen_at = now;
                }
                None => {
                    changed = true;
                    self.entries.insert(
                        key.clone(),
                        TrackedFrame {
                            key,
                            rect,
                            last_seen_at: now,
                        },
                    );
                }
            }
        }
        changed
    }

    /// Drop entries not seen for more than `timeout_ms`; returns the number removed
    pub(crate) fn remove_stale(&mut self, now: u64, timeout_ms: u64) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_sub(entry.last_seen_at) <= timeout_ms);
        before - self.entries.len()
    }

    pub(crate) fn rects(&self) -> Vec<Rect> {
        self.entries.values().map(|e| e.rect).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(items: &[(&str, Rect)]) -> HashMap<String, Rect> {
        items.iter().map(|(k, r)| (k.to_string(), *r)).collect()
    }

    #[test]
    fn update_reports_changes_only_when_visible_set_moves() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let mut state = TrackerState::default();
        assert!(state.apply_update(frames(&[("a", rect)]), 0));
        assert!(!state.apply_update(frames(&[("a", rect)]), 10));
        assert_eq!(state.entries["a"].last_seen_at, 10);
        assert!(state.apply_update(frames(&[("a", rect.translate(1.0, 0.0))]), 20));
        assert!(state.apply_update(frames(&[]), 30));
        assert!(!state.apply_update(frames(&[]), 40));
    }

    #[test]
    fn stale_removal_is_strictly_greater_than_timeout() {
        let mut state = TrackerState::default();
        state.apply_update(frames(&[("a", Rect::new(0.0, 0.0, 1.0, 1.0))]), 0);
        assert_eq!(state.remove_stale(1000, 1000), 0);
        assert_eq!(state.remove_stale(1001, 1000), 1);
        assert!(state.entries.is_empty());
    }
}
