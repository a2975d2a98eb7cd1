//! Print frame repeat schedules.

use anacap::{FrameRateConverter, Rational, StandardFrameRate};
use clap::Args;
use console::style;
use serde::Serialize;

/// Longest cycle printed in full.
const MAX_CYCLE_SHOWN: u64 = 32;

/// Show how many display intervals each source frame gets.
#[derive(Args, Debug)]
pub struct CmdSchedule {
    /// Source frame rate, e.g. 25 or 30000/1001
    #[arg(long, default_value = "30000/1001")]
    pub source: Rational,

    /// Display rate
    #[arg(long, default_value = "60")]
    pub target: Rational,

    /// Number of source frames to schedule
    #[arg(long, default_value_t = 10)]
    pub frames: usize,

    /// List the standard frame rates instead
    #[arg(long)]
    pub list: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Schedule information for display.
#[derive(Debug, Serialize)]
struct ScheduleInfo {
    source: Rational,
    target: Rational,
    ratio: Rational,
    cycle_len: u64,
    cycle: Option<Vec<u64>>,
    repeat_counts: Vec<u64>,
    frames_out: u64,
    drift: Rational,
}

impl CmdSchedule {
    /// Execute the schedule command.
    pub fn run(&self) -> anyhow::Result<()> {
        if self.list {
            self.print_rates()?;
            return Ok(());
        }

        let mut converter = FrameRateConverter::new(self.source, self.target)?;
        let cycle_len = converter.cycle_len();
        let cycle = (cycle_len <= MAX_CYCLE_SHOWN)
            .then(|| converter.schedule().cadence().collect::<Vec<_>>());
        let repeat_counts: Vec<u64> = (0..self.frames)
            .map(|_| converter.next_frame_repeat_count())
            .collect();

        let info = ScheduleInfo {
            source: self.source,
            target: self.target,
            ratio: converter.ratio(),
            cycle_len,
            cycle,
            repeat_counts,
            frames_out: converter.frames_out(),
            drift: converter.drift(),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&info)?);
        } else {
            print_schedule(&info);
        }
        Ok(())
    }

    fn print_rates(&self) -> anyhow::Result<()> {
        if self.json {
            let rates: Vec<_> = StandardFrameRate::ALL
                .iter()
                .map(|rate| serde_json::json!({ "name": rate, "fps": rate.to_rational() }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "rates": rates }))?);
            return Ok(());
        }

        println!();
        println!("{}", style("Standard Frame Rates").cyan().bold());
        println!();
        for rate in StandardFrameRate::ALL {
            println!("  {}", style(rate).yellow());
        }
        println!();
        Ok(())
    }
}

fn print_schedule(info: &ScheduleInfo) {
    println!();
    println!(
        "{}: {} -> {} (ratio {})",
        style("Schedule").cyan().bold(),
        style(info.source).yellow(),
        style(info.target).yellow(),
        info.ratio
    );
    println!();
    println!("  {:<16} {} frames", style("Cycle:").white(), info.cycle_len);
    if let Some(ref cycle) = info.cycle {
        println!("  {:<16} {}", style("Cadence:").white(), join(cycle));
    }
    println!("  {:<16} {}", style("Repeats:").white(), join(&info.repeat_counts));
    println!(
        "  {:<16} {} in, {} out",
        style("Frames:").white(),
        info.repeat_counts.len(),
        info.frames_out
    );
    println!("  {:<16} {}", style("Drift:").white(), info.drift);
    println!();
}

fn join(counts: &[u64]) -> String {
    counts
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
