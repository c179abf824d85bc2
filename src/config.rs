use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ScanError, ScanResult};
use crate::selection::{FocusArea, SelectionStrategy};

fn parse_env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

static FRAME_TIMEOUT_MS: OnceLock<u64> = OnceLock::new();

/// How long a highlight survives without being refreshed
pub fn frame_timeout_ms() -> u64 {
    *FRAME_TIMEOUT_MS.get_or_init(|| parse_env_u64("SCAN_FRAME_TIMEOUT_MS", 1000))
}

static SWEEP_DELAY_MS: OnceLock<u64> = OnceLock::new();

/// Delay between expiry sweeps while highlights are active
pub fn sweep_delay_ms() -> u64 {
    *SWEEP_DELAY_MS.get_or_init(|| parse_env_u64("SCAN_SWEEP_DELAY_MS", 1000).max(1))
}

static EMISSION_INTERVAL_MS: OnceLock<u64> = OnceLock::new();

/// Default minimum interval between emissions
pub fn default_emission_interval_ms() -> u64 {
    *EMISSION_INTERVAL_MS.get_or_init(|| parse_env_u64("SCAN_EMISSION_INTERVAL_MS", 500))
}

/// Timing of the highlight tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSettings {
    /// Entries older than this are removed by the expiry sweep
    pub frame_timeout: Duration,
    /// Delay before the next expiry sweep
    pub sweep_delay: Duration,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            frame_timeout: Duration::from_millis(frame_timeout_ms()),
            sweep_delay: Duration::from_millis(sweep_delay_ms()),
        }
    }
}

/// Highlight display settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrameSettings {
    /// Draw highlight boxes around detected barcodes
    pub enabled: bool,
    /// Only highlight barcodes fully inside the focus area
    #[serde(alias = "onlyInFocusArea")]
    pub only_within_focus_area: bool,
}

/// Everything the pipeline needs to decide on one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Scan restriction region
    pub focus_area: FocusArea,
    /// Multi-barcode selection policy; unknown names load as `ALL`
    #[serde(deserialize_with = "deserialize_strategy_lossy")]
    pub strategy: SelectionStrategy,
    /// Highlight display settings
    pub frames: FrameSettings,
    /// Minimum interval between emissions in milliseconds; 0 disables debouncing
    pub emission_interval_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            focus_area: FocusArea::default(),
            strategy: SelectionStrategy::default(),
            frames: FrameSettings::default(),
            emission_interval_ms: default_emission_interval_ms(),
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> ScanResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ScanResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }
}

fn deserialize_strategy_lossy<'de, D>(deserializer: D) -> Result<SelectionStrategy, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    Ok(SelectionStrategy::from_name_lossy(&name))
}

/// Convert a signed millisecond interval, clamping negatives to zero
pub fn clamp_interval_ms(ms: i64) -> u64 {
    ms.max(0) as u64
}

/// Convert an interval in seconds to milliseconds, clamping negatives and NaN to zero
pub fn interval_secs_to_ms(secs: f64) -> u64 {
    if secs.is_nan() || secs <= 0.0 {
        0
    } else {
        (secs * 1000.0).min(u64::MAX as f64) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rect;

    #[test]
    fn empty_json_yields_defaults() {
        let config = PipelineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.strategy, SelectionStrategy::All);
        assert!(!config.focus_area.enabled);
    }

    #[test]
    fn parses_full_config() {
        let config = PipelineConfig::from_json_str(
            r#"{
                "focusArea": {"enabled": true, "rect": {"left": 0, "top": 0, "right": 100, "bottom": 100}},
                "strategy": "BIGGEST",
                "frames": {"enabled": true, "onlyInFocusArea": true},
                "emissionIntervalMs": 250
            }"#,
        )
        .unwrap();
        assert_eq!(config.focus_area, FocusArea::enabled(Rect::new(0.0, 0.0, 100.0, 100.0)));
        assert_eq!(config.strategy, SelectionStrategy::Biggest);
        assert!(config.frames.enabled && config.frames.only_within_focus_area);
        assert_eq!(config.emission_interval_ms, 250);
    }

    #[test]
    fn unknown_strategy_in_json_degrades_to_all() {
        let config = PipelineConfig::from_json_str(r#"{"strategy": "LARGEST"}"#).unwrap();
        assert_eq!(config.strategy, SelectionStrategy::All);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = PipelineConfig::from_json_str(r#"{"emissionIntervalMs": "soon"}"#).unwrap_err();
        assert!(matches!(err, ScanError::InvalidConfig(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = PipelineConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn intervals_clamp_to_zero() {
        assert_eq!(clamp_interval_ms(-40), 0);
        assert_eq!(clamp_interval_ms(40), 40);
        assert_eq!(interval_secs_to_ms(-1.5), 0);
        assert_eq!(interval_secs_to_ms(f64::NAN), 0);
        assert_eq!(interval_secs_to_ms(0.5), 500);
    }
}
