//! Anacap CLI - Command-line interface for the analog capture pipeline.

mod commands;

use anacap::VideoStandard;
use clap::{Parser, Subcommand};
use console::style;

/// Command-line arguments for the anacap tool.
#[derive(Parser, Debug)]
#[command(name = "anacap")]
#[command(version)]
#[command(about = "Analog video capture: stream synchronization and display pacing")]
#[command(long_about = "Anacap recovers interlaced frames from the raw byte stream of \n\
    USB analog capture devices and paces them onto a display rate.\n\n\
    EXAMPLES:\n    \
    anacap synth --standard ntsc --frames 30 -o capture.raw\n    \
    anacap sync capture.raw --discard-budget 64\n    \
    anacap sync capture.raw --config capture.json --json\n    \
    anacap schedule --source 30000/1001 --target 60")]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a synthetic capture stream to a file
    Synth(commands::CmdSynth),
    /// Run a raw capture dump through the pipeline
    Sync(commands::CmdSync),
    /// Print the frame repeat schedule for a rate conversion
    Schedule(commands::CmdSchedule),
}

/// Parse a video standard name for clap.
pub(crate) fn parse_standard(s: &str) -> Result<VideoStandard, String> {
    VideoStandard::parse(s).ok_or_else(|| format!("unknown video standard {s:?} (ntsc, pal)"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else if cli.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        })
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let result = match &cli.command {
        Command::Synth(cmd) => cmd.run(),
        Command::Sync(cmd) => cmd.run(),
        Command::Schedule(cmd) => cmd.run(),
    };

    if let Err(ref e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
    result
}
