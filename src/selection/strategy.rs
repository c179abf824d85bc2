use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ScanError;
use crate::models::BarcodeCandidate;

/// Policy for reducing the barcodes visible in one frame to those reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionStrategy {
    /// First candidate in detection order
    One,
    /// Every candidate, unchanged
    #[default]
    All,
    /// Only the candidate with the largest area
    Biggest,
    /// Every candidate, largest area first
    SortByBiggest,
}

impl SelectionStrategy {
    /// Wire name, e.g. `"SORT_BY_BIGGEST"`
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionStrategy::One => "ONE",
            SelectionStrategy::All => "ALL",
            SelectionStrategy::Biggest => "BIGGEST",
            SelectionStrategy::SortByBiggest => "SORT_BY_BIGGEST",
        }
    }

    /// Parse a strategy name, falling back to `All` for unknown names
    pub fn from_name_lossy(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!(strategy = name, "Unknown scan strategy, defaulting to ALL");
            SelectionStrategy::All
        })
    }

    /// Apply this strategy to `candidates`
    pub fn select(&self, candidates: &[BarcodeCandidate]) -> Vec<BarcodeCandidate> {
        select(candidates, *self)
    }
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionStrategy {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ONE" => Ok(SelectionStrategy::One),
            "ALL" => Ok(SelectionStrategy::All),
            "BIGGEST" => Ok(SelectionStrategy::Biggest),
            "SORT_BY_BIGGEST" => Ok(SelectionStrategy::SortByBiggest),
            _ => Err(ScanError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Reduce or reorder `candidates` according to `strategy`
///
/// Areas are computed from each candidate's rectangle here, never cached
/// from an earlier stage. Ties keep input order for both `Biggest` and
/// `SortByBiggest`.
pub fn select(
    candidates: &[BarcodeCandidate],
    strategy: SelectionStrategy,
) -> Vec<BarcodeCandidate> {
    if candidates.is_empty() {
        return Vec::new();
    }

    match strategy {
        SelectionStrategy::One => vec![candidates[0].clone()],
        SelectionStrategy::All => candidates.to_vec(),
        SelectionStrategy::Biggest => biggest(candidates).into_iter().cloned().collect(),
        SelectionStrategy::SortByBiggest => {
            let mut sorted = candidates.to_vec();
            // sort_by is stable, so equal areas keep detection order
            sorted.sort_by(|a, b| b.area().total_cmp(&a.area()));
            sorted
        }
    }
}

fn biggest(candidates: &[BarcodeCandidate]) -> Option<&BarcodeCandidate> {
    let mut best: Option<(&BarcodeCandidate, f32)> = None;
    for candidate in candidates {
        let area = candidate.area();
        match best {
            Some((_, best_area)) if area <= best_area => {}
            _ => best = Some((candidate, area)),
        }
    }
    best.map(|(c, _)| c)
}
