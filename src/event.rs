//! Payload delivered to the application when a frame is emitted

use serde::{Deserialize, Serialize};

use crate::models::{BarcodeCandidate, BarcodeFormat, Rect};

/// One reported barcode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedBarcode {
    /// Decoded payload, empty when the detector could not read one
    pub data: String,
    /// Symbology
    pub format: BarcodeFormat,
    /// Emission time in milliseconds
    pub timestamp: u64,
    /// Bounding box in view coordinates
    pub bounding_box: Rect,
    /// Area of `bounding_box`
    pub area: f32,
}

/// Event emitted for a frame whose selection passed the emission gate
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanEvent {
    /// Reported barcodes in strategy order
    pub barcodes: Vec<ScannedBarcode>,
}

impl ScanEvent {
    /// Build the event for `reported` candidates emitted at `timestamp`
    pub fn from_candidates(reported: &[BarcodeCandidate], timestamp: u64) -> Self {
        let barcodes = reported
            .iter()
            .map(|c| ScannedBarcode {
                data: c.value.clone().unwrap_or_default(),
                format: c.format,
                timestamp,
                bounding_box: c.rect,
                area: c.area(),
            })
            .collect();
        Self { barcodes }
    }

    /// Serialize to the JSON shape the UI layer consumes
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
