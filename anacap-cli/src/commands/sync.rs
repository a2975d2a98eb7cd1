//! Run a raw capture dump through the pipeline.

use anacap::{
    CaptureConfig, CapturePipeline, FrameBuffer, PipelineStats, Presenter, Rational,
    SignalStatus, VideoStandard,
};
use anacap_sync::find_field_start;
use anyhow::Context;
use clap::Args;
use console::style;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Decode a raw capture dump and report what the pipeline saw.
#[derive(Args, Debug)]
pub struct CmdSync {
    /// Raw capture dump
    pub input: PathBuf,

    /// Capture configuration (JSON); replaces the options below
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Video standard (ntsc, pal)
    #[arg(long, default_value = "ntsc", value_parser = crate::parse_standard)]
    pub standard: VideoStandard,

    /// Bytes past the expected row marker tolerated before the lock is lost
    #[arg(long, default_value_t = 64)]
    pub discard_budget: usize,

    /// Display rate, e.g. 60 or 60000/1001
    #[arg(long)]
    pub target: Option<Rational>,

    /// Transfer size fed to the pipeline
    #[arg(long, default_value_t = 16384)]
    pub chunk: usize,

    /// Write the last complete frame to this file
    #[arg(long)]
    pub frame_out: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Keeps the repeat counts and the last frame.
#[derive(Default)]
struct Tally {
    repeats: Vec<u64>,
    last: Option<Vec<u8>>,
    keep_last: bool,
    signal_lost: bool,
}

impl Presenter for Tally {
    fn present(&mut self, frame: &FrameBuffer, repeat_count: u64) {
        self.repeats.push(repeat_count);
        if self.keep_last {
            self.last = Some(frame.data().to_vec());
        }
    }

    fn signal_lost(&mut self) {
        self.signal_lost = true;
    }
}

/// Summary printed at the end.
#[derive(Debug, Serialize)]
struct SyncSummary {
    input: String,
    standard: VideoStandard,
    first_field_offset: Option<usize>,
    status: SignalStatus,
    stats: PipelineStats,
    repeat_counts: Vec<u64>,
}

impl CmdSync {
    /// Execute the sync command.
    pub fn run(&self) -> anyhow::Result<()> {
        let config = self.load_config()?;
        if self.chunk == 0 {
            anyhow::bail!("--chunk must be positive");
        }

        let dump = std::fs::read(&self.input)
            .with_context(|| format!("reading {}", self.input.display()))?;
        info!(bytes = dump.len(), chunk = self.chunk, "decoding dump");

        let tally = Tally {
            keep_last: self.frame_out.is_some(),
            ..Default::default()
        };
        let mut pipeline = CapturePipeline::new(&config, tally)?;
        let mut status = pipeline.status();
        for chunk in dump.chunks(self.chunk) {
            status = pipeline.push(chunk)?;
            if status == SignalStatus::NoSignal {
                break;
            }
        }

        let summary = SyncSummary {
            input: self.input.display().to_string(),
            standard: config.standard,
            first_field_offset: find_field_start(&dump).map(|(end, _)| end - anacap_sync::MARKER_LEN),
            status,
            stats: *pipeline.stats(),
            repeat_counts: pipeline.presenter().repeats.clone(),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&summary);
        }

        if let (Some(path), Some(frame)) = (&self.frame_out, &pipeline.presenter().last) {
            std::fs::write(path, frame).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "last frame written");
        }

        pipeline.ensure_signal()?;
        Ok(())
    }

    fn load_config(&self) -> anyhow::Result<CaptureConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                CaptureConfig::from_json(&json)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => CaptureConfig::new(self.standard, self.discard_budget),
        };
        if let Some(target) = self.target {
            config = config.with_target_rate(target);
        }
        config.validate()?;
        Ok(config)
    }
}

fn print_summary(summary: &SyncSummary) {
    let stats = &summary.stats;
    let status = match summary.status {
        SignalStatus::Locked => style(summary.status).green(),
        SignalStatus::Searching => style(summary.status).yellow(),
        SignalStatus::NoSignal => style(summary.status).red(),
    };

    println!();
    println!("{}: {}", style("Capture").cyan().bold(), style(&summary.input).yellow());
    println!();
    println!("  {:<20} {}", style("Standard:").white(), summary.standard);
    println!("  {:<20} {}", style("Signal:").white(), status);
    println!("  {:<20} {}", style("Bytes:").white(), stats.bytes_in);
    match summary.first_field_offset {
        Some(offset) => println!("  {:<20} {}", style("First field at:").white(), offset),
        None => println!("  {:<20} {}", style("First field at:").white(), style("none").dim()),
    }
    println!("  {:<20} {}", style("Locks acquired:").white(), stats.sync.locks_acquired);
    println!("  {:<20} {}", style("Locks lost:").white(), stats.sync.locks_lost);
    println!("  {:<20} {}", style("Rows written:").white(), stats.sync.rows_written);
    if stats.sync.overflowed_rows > 0 {
        println!(
            "  {:<20} {}",
            style("Overflowed rows:").white(),
            style(stats.sync.overflowed_rows).red()
        );
    }
    println!("  {:<20} {}", style("Frames:").white(), stats.frames_presented);
    println!("  {:<20} {}", style("Display intervals:").white(), stats.intervals_presented);
    if stats.frames_dropped > 0 {
        println!("  {:<20} {}", style("Dropped:").white(), stats.frames_dropped);
    }
    if stats.timeouts > 0 {
        println!("  {:<20} {}", style("Timeouts:").white(), style(stats.timeouts).yellow());
    }
    println!();
}
