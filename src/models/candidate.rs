use serde::{Deserialize, Serialize};

use super::{BarcodeFormat, Rect};

/// One barcode detected in the current frame, before filtering or selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarcodeCandidate {
    /// Decoded payload; may repeat within a frame or be missing
    #[serde(default)]
    pub value: Option<String>,
    /// Symbology
    #[serde(default)]
    pub format: BarcodeFormat,
    /// Bounding box in view coordinates
    pub rect: Rect,
}

impl BarcodeCandidate {
    /// Create a candidate with a known value
    pub fn new(value: impl Into<String>, format: BarcodeFormat, rect: Rect) -> Self {
        Self {
            value: Some(value.into()),
            format,
            rect,
        }
    }

    /// Create a candidate whose payload could not be read
    pub fn without_value(format: BarcodeFormat, rect: Rect) -> Self {
        Self {
            value: None,
            format,
            rect,
        }
    }

    /// Area of the bounding box, computed on every call
    pub fn area(&self) -> f32 {
        self.rect.area()
    }

    /// Key used for highlight tracking; `None` for missing or empty values
    pub fn highlight_key(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.is_empty())
    }
}
