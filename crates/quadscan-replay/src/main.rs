// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// quadscan-replay — feed a recorded observation trace through the rectangle
// stabilizer and print the decision made for every frame.
//
// A trace is JSON lines: each line is either `null` (no rectangle in that
// frame) or a quadrilateral object. Blank lines are skipped.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use quadscan_core::error::Result;
use quadscan_core::human_errors::humanize_error;
use quadscan_core::{Quadrilateral, ScanConfig, StabilizerConfig};
use quadscan_scan::{Decision, RectangleStabilizer};
use serde::Serialize;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "quadscan-replay")]
#[command(about = "Replay a rectangle observation trace through the quadscan stabilizer", long_about = None)]
struct Cli {
    /// Scan settings file (JSON); only the stabilizer section is used
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Observation trace (JSON lines)
    trace: PathBuf,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One JSON object per frame
    Json,
    /// Human-readable, one line per frame
    Text,
}

/// One output line.
#[derive(Serialize)]
struct FrameDecision {
    frame: usize,
    #[serde(flatten)]
    decision: Decision,
}

/// Decision counts over a whole trace.
#[derive(Debug, Default, PartialEq, Eq)]
struct ReplaySummary {
    frames: usize,
    shown: usize,
    cleared: usize,
    auto_captures: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "replay failed");
            let human = humanize_error(&e);
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut stabilizer = load_stabilizer(cli.config.as_deref())?;

    let reader = BufReader::new(File::open(&cli.trace)?);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let summary = replay(reader, &mut out, &mut stabilizer, cli.format)?;
    out.flush()?;

    info!(
        trace = %cli.trace.display(),
        frames = summary.frames,
        shown = summary.shown,
        cleared = summary.cleared,
        auto_captures = summary.auto_captures,
        "replay complete"
    );
    Ok(())
}

fn load_stabilizer(config: Option<&Path>) -> Result<RectangleStabilizer> {
    let config = match config {
        Some(path) => ScanConfig::load(path)?.stabilizer,
        None => StabilizerConfig::default(),
    };
    RectangleStabilizer::new(config)
}

/// Run every observation in `reader` through `stabilizer`, writing one line
/// per frame to `out`.
fn replay<R: BufRead, W: Write>(
    reader: R,
    out: &mut W,
    stabilizer: &mut RectangleStabilizer,
    format: OutputFormat,
) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let observation: Option<Quadrilateral> = serde_json::from_str(line).map_err(|e| {
            error!(line = index + 1, error = %e, "malformed observation");
            e
        })?;

        let decision = stabilizer.observe(observation);
        let frame = summary.frames;
        summary.frames += 1;
        match decision {
            Decision::NoChange => {}
            Decision::Clear => summary.cleared += 1,
            Decision::Show(_) => summary.shown += 1,
            Decision::ShowAndAutoCapture(_) => {
                summary.shown += 1;
                summary.auto_captures += 1;
            }
        }

        match format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, &FrameDecision { frame, decision })?;
                writeln!(out)?;
            }
            OutputFormat::Text => writeln!(out, "{}", describe(frame, &decision))?,
        }
    }

    Ok(summary)
}

fn describe(frame: usize, decision: &Decision) -> String {
    match decision {
        Decision::NoChange => format!("{frame:>5}  no change"),
        Decision::Clear => format!("{frame:>5}  clear"),
        Decision::Show(q) => format!("{frame:>5}  show {q}"),
        Decision::ShowAndAutoCapture(q) => format!("{frame:>5}  show + capture {q}"),
    }
}
