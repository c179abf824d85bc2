//! Recorded-session replay
//!
//! A session is a JSON-lines file. Each line is a record with a clock time
//! `t` (milliseconds) and a `type`:
//!
//! ```text
//! {"t": 0,   "type": "frame", "candidates": [{"value": "123", "format": "QR_CODE", "rect": {...}}]}
//! {"t": 40,  "type": "pause"}
//! {"t": 90,  "type": "resume"}
//! {"t": 120, "type": "config", "config": {"strategy": "BIGGEST"}}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Replays run on a
//! manual clock, so a session always produces the same decisions.

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::ManualClock;
use crate::config::{PipelineConfig, TrackerSettings};
use crate::error::{ScanError, ScanResult};
use crate::models::BarcodeCandidate;
use crate::pipeline::ScanPipeline;

/// One timed line of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Clock time in milliseconds
    pub t: u64,
    /// What happened at `t`
    #[serde(flatten)]
    pub event: SessionEvent,
}

/// Input to the pipeline at one point in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SessionEvent {
    /// Candidates detected in one frame
    Frame {
        /// Detected barcodes in detector order
        #[serde(default)]
        candidates: Vec<BarcodeCandidate>,
    },
    /// Scanning paused
    Pause,
    /// Scanning resumed
    Resume,
    /// Configuration replaced
    Config {
        /// New configuration
        config: PipelineConfig,
    },
}

/// Aggregate outcome of replaying a session
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ReplaySummary {
    /// Frame records processed
    pub frames: usize,
    /// Frames discarded because scanning was paused
    pub paused_frames: usize,
    /// Frames whose selection was emitted
    pub emitted: usize,
    /// Barcodes delivered across all emitted frames
    pub reported_barcodes: usize,
    /// Distinct values delivered
    pub distinct_values: BTreeSet<String>,
    /// Largest number of simultaneous highlights
    pub peak_highlights: usize,
}

/// Parse session records from JSON-lines text
///
/// `path` is only used in error messages.
pub fn parse_session(contents: &str, path: &Path) -> ScanResult<Vec<SessionRecord>> {
    let mut records = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record = serde_json::from_str(trimmed).map_err(|source| ScanError::MalformedRecord {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Load a session file
pub fn load_session<P: AsRef<Path>>(path: P) -> ScanResult<Vec<SessionRecord>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_session(&contents, path)
}

/// Replay records through a fresh pipeline configured with `config`
pub fn replay(records: &[SessionRecord], config: PipelineConfig) -> ReplaySummary {
    let start = records.first().map(|r| r.t).unwrap_or(0);
    let clock = ManualClock::new(start);
    let pipeline = ScanPipeline::with_clock(config, clock.clone(), TrackerSettings::default());
    let mut summary = ReplaySummary::default();

    for record in records {
        clock.set(record.t);
        // Stand in for the sweep timer, which runs on real time.
        if pipeline
            .tracker()
            .pending_sweep_at()
            .is_some_and(|due| due <= record.t)
        {
            pipeline.tracker().expiry_sweep();
        }

        match &record.event {
            SessionEvent::Frame { candidates } => {
                summary.frames += 1;
                if pipeline.is_paused() {
                    summary.paused_frames += 1;
                }
                let decision = pipeline.process(candidates);
                summary.peak_highlights =
                    summary.peak_highlights.max(decision.highlight_rects.len());
                if decision.emit {
                    summary.emitted += 1;
                    summary.reported_barcodes += decision.reported.len();
                    summary
                        .distinct_values
                        .extend(decision.reported.iter().filter_map(|c| c.value.clone()));
                }
            }
            SessionEvent::Pause => pipeline.pause(),
            SessionEvent::Resume => pipeline.resume(),
            SessionEvent::Config { config } => pipeline.set_config(config.clone()),
        }
    }

    pipeline.shutdown();
    debug!(
        frames = summary.frames,
        emitted = summary.emitted,
        "Session replay complete"
    );
    summary
}

/// Load and replay every session in parallel
pub fn replay_all(
    paths: &[PathBuf],
    config: &PipelineConfig,
) -> Vec<(PathBuf, ScanResult<ReplaySummary>)> {
    paths
        .par_iter()
        .map(|path| {
            let result = load_session(path).map(|records| replay(&records, config.clone()));
            (path.clone(), result)
        })
        .collect()
}

/// Default session root from environment variables.
pub fn session_root_from_env() -> PathBuf {
    env::var("SCAN_SESSION_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("sessions"))
}

/// Default session limit from environment variables.
///
/// Returns `None` (every session) when `SCAN_SESSION_LIMIT` is unset or `0`.
pub fn session_limit_from_env() -> Option<usize> {
    match env::var("SCAN_SESSION_LIMIT") {
        Ok(value) => value
            .parse::<usize>()
            .ok()
            .and_then(|v| if v == 0 { None } else { Some(v) }),
        Err(_) => None,
    }
}

/// Iterate session files under `root`, sorted, with an optional limit.
pub fn session_iter<P: AsRef<Path>>(
    root: P,
    limit: Option<usize>,
) -> impl Iterator<Item = PathBuf> {
    let mut sessions = collect_sessions(root.as_ref());
    sessions.sort();
    if let Some(limit) = limit {
        sessions.truncate(limit);
    }
    sessions.into_iter()
}

fn collect_sessions(root: &Path) -> Vec<PathBuf> {
    let mut stack = vec![root.to_path_buf()];
    let mut sessions = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                if ext == "jsonl" || ext == "ndjson" {
                    sessions.push(path);
                }
            }
        }
    }

    sessions
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before UNIX epoch")
            .as_nanos();
        let sequence = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("scan_gate_sessions_{nanos}_{sequence}"));
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    const SESSION: &str = r#"
# two sightings of the same code, then a pause/resume
{"t": 0, "type": "frame", "candidates": [{"value": "123", "format": "QR_CODE", "rect": {"left": 0, "top": 0, "right": 10, "bottom": 10}}]}
{"t": 100, "type": "frame", "candidates": [{"value": "123", "format": "QR_CODE", "rect": {"left": 0, "top": 0, "right": 10, "bottom": 10}}]}
{"t": 150, "type": "pause"}
{"t": 160, "type": "frame", "candidates": [{"value": "123", "format": "QR_CODE", "rect": {"left": 0, "top": 0, "right": 10, "bottom": 10}}]}
{"t": 170, "type": "resume"}
{"t": 180, "type": "frame", "candidates": [{"value": "456", "rect": {"left": 0, "top": 0, "right": 20, "bottom": 20}}]}
"#;

    #[test]
    fn parse_skips_comments_and_blank_lines() {
        let records = parse_session(SESSION, Path::new("inline")).unwrap();
        assert_eq!(records.len(), 6);
        assert_eq!(records[2], SessionRecord { t: 150, event: SessionEvent::Pause });
    }

    #[test]
    fn parse_reports_line_of_bad_record() {
        let contents = "{\"t\": 0, \"type\": \"pause\"}\n{\"t\": 1, \"type\": \"zoom\"}\n";
        let err = parse_session(contents, Path::new("s.jsonl")).unwrap_err();
        assert!(matches!(err, ScanError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn replay_applies_debounce_and_pause() {
        let records = parse_session(SESSION, Path::new("inline")).unwrap();
        let summary = replay(
            &records,
            PipelineConfig {
                emission_interval_ms: 500,
                ..Default::default()
            },
        );
        assert_eq!(summary.frames, 4);
        assert_eq!(summary.paused_frames, 1);
        // t=0 emits, t=100 is debounced, t=180 emits because resume reset the gate.
        assert_eq!(summary.emitted, 2);
        assert_eq!(
            summary.distinct_values.into_iter().collect::<Vec<_>>(),
            vec!["123".to_string(), "456".to_string()]
        );
    }

    #[test]
    fn session_iter_finds_nested_jsonl_sorted_and_limited() {
        let root = temp_dir();
        fs::create_dir_all(root.join("nested")).unwrap();
        fs::write(root.join("b.jsonl"), "").unwrap();
        fs::write(root.join("nested").join("a.jsonl"), "").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();

        let all: Vec<PathBuf> = session_iter(&root, None).collect();
        assert_eq!(all.len(), 2);
        assert!(all.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(session_iter(&root, Some(1)).count(), 1);

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn replay_all_reports_per_file_results() {
        let root = temp_dir();
        let good = root.join("good.jsonl");
        fs::write(&good, SESSION).unwrap();
        let missing = root.join("missing.jsonl");

        let results = replay_all(&[good.clone(), missing.clone()], &PipelineConfig::default());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, good);
        assert!(results[0].1.is_ok());
        assert!(matches!(results[1].1, Err(ScanError::Io { .. })));

        let _ = fs::remove_dir_all(root);
    }
}
