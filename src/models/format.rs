use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// Symbology reported by the upstream detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BarcodeFormat {
    /// QR code
    QrCode,
    /// Code 128
    #[serde(rename = "CODE_128")]
    Code128,
    /// Code 39
    #[serde(rename = "CODE_39")]
    Code39,
    /// EAN-13
    #[serde(rename = "EAN_13")]
    Ean13,
    /// EAN-8
    #[serde(rename = "EAN_8")]
    Ean8,
    /// UPC-A
    UpcA,
    /// UPC-E
    UpcE,
    /// Data Matrix
    DataMatrix,
    /// PDF417
    #[serde(rename = "PDF_417")]
    Pdf417,
    /// Aztec
    Aztec,
    /// Interleaved 2 of 5
    Itf,
    /// Anything the detector reported that is not listed above
    #[default]
    #[serde(other)]
    Unknown,
}

impl BarcodeFormat {
    /// All named formats, excluding `Unknown`
    pub const ALL: [BarcodeFormat; 11] = [
        BarcodeFormat::QrCode,
        BarcodeFormat::Code128,
        BarcodeFormat::Code39,
        BarcodeFormat::Ean13,
        BarcodeFormat::Ean8,
        BarcodeFormat::UpcA,
        BarcodeFormat::UpcE,
        BarcodeFormat::DataMatrix,
        BarcodeFormat::Pdf417,
        BarcodeFormat::Aztec,
        BarcodeFormat::Itf,
    ];

    /// Wire name, e.g. `"QR_CODE"`
    pub fn as_str(&self) -> &'static str {
        match self {
            BarcodeFormat::QrCode => "QR_CODE",
            BarcodeFormat::Code128 => "CODE_128",
            BarcodeFormat::Code39 => "CODE_39",
            BarcodeFormat::Ean13 => "EAN_13",
            BarcodeFormat::Ean8 => "EAN_8",
            BarcodeFormat::UpcA => "UPC_A",
            BarcodeFormat::UpcE => "UPC_E",
            BarcodeFormat::DataMatrix => "DATA_MATRIX",
            BarcodeFormat::Pdf417 => "PDF_417",
            BarcodeFormat::Aztec => "AZTEC",
            BarcodeFormat::Itf => "ITF",
            BarcodeFormat::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BarcodeFormat {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.eq_ignore_ascii_case("UNKNOWN") {
            return Ok(BarcodeFormat::Unknown);
        }
        BarcodeFormat::ALL
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ScanError::UnknownFormat(s.to_string()))
    }
}
