use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scan_gate::PipelineConfig;
use scan_gate::tools::{
    ReplaySummary, load_session, replay, replay_all, session_iter, session_limit_from_env,
    session_root_from_env,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "scantool",
    version,
    about = "Replay recorded barcode sessions through the scan pipeline"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a single session file and print its summary
    Replay {
        #[arg(long)]
        session: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Replay every session under a directory in parallel
    Batch {
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file and print it with defaults filled in
    CheckConfig {
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Replay { session, config } => replay_cmd(&session, config.as_deref()),
        Command::Batch { root, limit, config } => batch_cmd(root, limit, config.as_deref()),
        Command::CheckConfig { config } => check_config_cmd(&config),
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn replay_cmd(session: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let records = load_session(session)
        .with_context(|| format!("loading session {}", session.display()))?;
    let start = Instant::now();
    let summary = replay(&records, config);
    info!(
        session = %session.display(),
        records = records.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Replayed session"
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn batch_cmd(root: Option<PathBuf>, limit: Option<usize>, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let root = root.unwrap_or_else(session_root_from_env);
    let limit = limit.or_else(session_limit_from_env);
    let sessions: Vec<PathBuf> = session_iter(&root, limit).collect();
    if sessions.is_empty() {
        warn!(root = %root.display(), "No session files found");
        return Ok(());
    }

    let start = Instant::now();
    let results = replay_all(&sessions, &config);

    let mut total = ReplaySummary::default();
    let mut failed = 0usize;
    for (path, result) in &results {
        match result {
            Ok(summary) => {
                println!(
                    "{}: frames={} emitted={} reported={} distinct={} peak_highlights={}",
                    path.display(),
                    summary.frames,
                    summary.emitted,
                    summary.reported_barcodes,
                    summary.distinct_values.len(),
                    summary.peak_highlights
                );
                total.frames += summary.frames;
                total.paused_frames += summary.paused_frames;
                total.emitted += summary.emitted;
                total.reported_barcodes += summary.reported_barcodes;
                total.distinct_values.extend(summary.distinct_values.iter().cloned());
                total.peak_highlights = total.peak_highlights.max(summary.peak_highlights);
            }
            Err(e) => {
                failed += 1;
                warn!(session = %path.display(), error = %e, "Session failed");
            }
        }
    }

    println!(
        "Sessions: {} ({} failed) in {:.1}ms",
        results.len(),
        failed,
        start.elapsed().as_secs_f64() * 1000.0
    );
    println!(
        "Total: frames={} paused={} emitted={} reported={} distinct={}",
        total.frames,
        total.paused_frames,
        total.emitted,
        total.reported_barcodes,
        total.distinct_values.len()
    );
    Ok(())
}

fn check_config_cmd(path: &Path) -> Result<()> {
    let config = load_config(Some(path))?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
