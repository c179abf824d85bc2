use std::path::PathBuf;

/// Result type for fallible scan-gate operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors raised outside the per-frame path
///
/// Frame processing itself never fails; these cover strict parsing,
/// configuration loading and session replay.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Strategy name outside the closed set
    #[error("Unknown selection strategy: {0}")]
    UnknownStrategy(String),

    /// Format name outside the closed set
    #[error("Unknown barcode format: {0}")]
    UnknownFormat(String),

    /// Configuration JSON did not parse
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// Reading a configuration or session file failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// A session line did not parse
    #[error("Malformed session record at {}:{line}: {source}", .path.display())]
    MalformedRecord {
        /// Session file
        path: PathBuf,
        /// One-based line number
        line: usize,
        /// Parse failure for that line
        #[source]
        source: serde_json::Error,
    },
}
