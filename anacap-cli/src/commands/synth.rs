//! Synthesize a capture stream.

use anacap::{PixelPattern, StreamSynthesizer, VideoStandard};
use anyhow::Context;
use clap::Args;
use console::style;
use std::path::PathBuf;
use tracing::info;

/// Write a synthetic BT.656-style stream, as a capture device would deliver it.
#[derive(Args, Debug)]
pub struct CmdSynth {
    /// Video standard (ntsc, pal)
    #[arg(long, default_value = "ntsc", value_parser = crate::parse_standard)]
    pub standard: VideoStandard,

    /// Number of frames
    #[arg(long, default_value_t = 30)]
    pub frames: usize,

    /// Vertical blanking lines before each field (standard's value if omitted)
    #[arg(long)]
    pub blanking: Option<usize>,

    /// Pixel pattern: ramp, bars or solid:<value>
    #[arg(long, default_value = "ramp", value_parser = parse_pattern)]
    pub pattern: PixelPattern,

    /// Bytes of noise to put in front of the stream
    #[arg(long, default_value_t = 0)]
    pub noise: usize,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,
}

impl CmdSynth {
    /// Execute the synth command.
    pub fn run(&self) -> anyhow::Result<()> {
        let config = self.standard.sync_config(1);
        let mut synth = StreamSynthesizer::from_config(&config)?
            .with_blanking_lines(self.blanking.unwrap_or(self.standard.blanking_lines()))
            .with_pattern(self.pattern);

        let mut bytes = noise(self.noise);
        bytes.extend_from_slice(&synth.stream(self.frames));
        std::fs::write(&self.output, &bytes)
            .with_context(|| format!("writing {}", self.output.display()))?;

        info!(frames = self.frames, bytes = bytes.len(), "stream written");
        println!(
            "{} {} frames of {} ({} bytes) to {}",
            style("Wrote").green().bold(),
            self.frames,
            style(self.standard).yellow(),
            bytes.len(),
            style(self.output.display()).white()
        );
        Ok(())
    }
}

fn parse_pattern(s: &str) -> Result<PixelPattern, String> {
    match s.to_lowercase().as_str() {
        "ramp" => Ok(PixelPattern::Ramp),
        "bars" => Ok(PixelPattern::Bars),
        other => match other.strip_prefix("solid:") {
            Some(value) => value
                .parse::<u8>()
                .map(PixelPattern::Solid)
                .map_err(|e| format!("solid value {value:?}: {e}")),
            None => Err(format!("unknown pattern {s:?} (ramp, bars, solid:<value>)")),
        },
    }
}

/// Marker-free filler bytes.
fn noise(len: usize) -> Vec<u8> {
    let mut state = 0x2545_f491u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state as u8).clamp(0x01, 0xFE)
        })
        .collect()
}
