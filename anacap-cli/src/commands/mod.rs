//! CLI subcommand implementations.

pub mod schedule;
pub mod synth;
pub mod sync;

pub use schedule::CmdSchedule;
pub use synth::CmdSynth;
pub use sync::CmdSync;
