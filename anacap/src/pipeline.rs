//! Capture pipeline.
//!
//! Wires the pieces together: raw bytes go through the [`Synchronizer`],
//! rows land in a [`FrameStore`], and every completed frame is handed to a
//! [`Presenter`] together with the number of display intervals the
//! [`FrameRateConverter`] assigns to it.

use crate::config::CaptureConfig;
use crate::error::{CaptureError, Result};
use crate::monitor::{SignalMonitor, SignalStatus};
use anacap_core::{FrameBuffer, FrameGeometry, FrameStorage, FrameStore};
use anacap_framerate::FrameRateConverter;
use anacap_sync::{SyncError, SyncReport, SyncState, Synchronizer};
use serde::Serialize;
use tracing::{debug, trace};

/// Receives decoded frames for display.
pub trait Presenter {
    /// Show `frame` for `repeat_count` display intervals.
    ///
    /// A count of zero means the frame is dropped to keep pace with a slower
    /// display.
    fn present(&mut self, frame: &FrameBuffer, repeat_count: u64);

    /// The source stopped sending video.
    fn signal_lost(&mut self) {}
}

impl<P: Presenter + ?Sized> Presenter for &mut P {
    fn present(&mut self, frame: &FrameBuffer, repeat_count: u64) {
        (**self).present(frame, repeat_count)
    }

    fn signal_lost(&mut self) {
        (**self).signal_lost()
    }
}

/// Counters of a capture session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    /// Raw bytes pushed.
    pub bytes_in: u64,
    /// Frames handed to the presenter.
    pub frames_presented: u64,
    /// Display intervals scheduled.
    pub intervals_presented: u64,
    /// Frames presented with a repeat count of zero.
    pub frames_dropped: u64,
    /// Sync timeouts seen.
    pub timeouts: u64,
    /// Synchronizer counters.
    pub sync: SyncReport,
}

/// Frame storage that presents each frame as it completes.
struct PresentingStore<'a, P: Presenter> {
    store: &'a mut FrameStore,
    converter: &'a mut FrameRateConverter,
    presenter: &'a mut P,
    stats: &'a mut PipelineStats,
}

impl<P: Presenter> FrameStorage for PresentingStore<'_, P> {
    fn geometry(&self) -> FrameGeometry {
        self.store.geometry()
    }

    fn write_row(&mut self, row: usize, offset: usize, bytes: &[u8]) -> usize {
        self.store.write_row(row, offset, bytes)
    }

    fn complete_frame(&mut self) {
        self.store.complete_frame();
        let repeat = self.converter.next_frame_repeat_count();
        if let Some(frame) = self.store.latest() {
            self.presenter.present(frame, repeat);
        }

        self.stats.frames_presented += 1;
        self.stats.intervals_presented += repeat;
        if repeat == 0 {
            self.stats.frames_dropped += 1;
        }
        trace!(frame = self.stats.frames_presented, repeat, "frame presented");
    }

    fn discard_frame(&mut self) {
        self.store.discard_frame();
    }
}

/// End-to-end capture pipeline for one stream.
pub struct CapturePipeline<P: Presenter> {
    sync: Synchronizer,
    state: SyncState,
    store: FrameStore,
    converter: FrameRateConverter,
    monitor: SignalMonitor,
    presenter: P,
    stats: PipelineStats,
}

impl<P: Presenter> CapturePipeline<P> {
    /// Build a pipeline from a configuration.
    pub fn new(config: &CaptureConfig, presenter: P) -> Result<Self> {
        config.validate()?;
        let sync = Synchronizer::new(config.sync_config())?;
        let converter = FrameRateConverter::new(config.source_rate(), config.target_rate)?;
        let store = FrameStore::new(sync.config().geometry);

        debug!(
            standard = %config.standard,
            source = %config.source_rate(),
            target = %config.target_rate,
            "capture pipeline created"
        );

        Ok(Self {
            sync,
            state: SyncState::new(),
            store,
            converter,
            monitor: SignalMonitor::new(config.no_signal_after),
            presenter,
            stats: PipelineStats::default(),
        })
    }

    /// Feed one chunk of raw bytes from the device.
    ///
    /// Sync timeouts are absorbed into the returned status; after enough of
    /// them in a row the status becomes [`SignalStatus::NoSignal`] and the
    /// presenter is told once.
    pub fn push(&mut self, bytes: &[u8]) -> Result<SignalStatus> {
        self.stats.bytes_in += bytes.len() as u64;

        let mut storage = PresentingStore {
            store: &mut self.store,
            converter: &mut self.converter,
            presenter: &mut self.presenter,
            stats: &mut self.stats,
        };
        let timed_out = match self.sync.process(&mut self.state, bytes, &mut storage) {
            Ok(_) => false,
            Err(SyncError::SyncTimeout { .. }) => true,
            Err(err) => return Err(err.into()),
        };
        if timed_out {
            self.stats.timeouts += 1;
        }
        self.stats.sync = *self.state.totals();

        let previous = self.monitor.status();
        let status = self.monitor.observe(self.state.is_locked(), timed_out);
        if status == SignalStatus::NoSignal && previous != SignalStatus::NoSignal {
            self.presenter.signal_lost();
        }
        Ok(status)
    }

    /// Fail with [`CaptureError::NoSignal`] if the signal is gone.
    pub fn ensure_signal(&self) -> Result<()> {
        match self.monitor.status() {
            SignalStatus::NoSignal => Err(CaptureError::NoSignal {
                timeouts: self.monitor.consecutive_timeouts(),
            }),
            _ => Ok(()),
        }
    }

    /// Current signal status.
    pub fn status(&self) -> SignalStatus {
        self.monitor.status()
    }

    /// Session counters.
    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Synchronizer state.
    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// Frame storage.
    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    /// Frame rate converter.
    pub fn converter(&self) -> &FrameRateConverter {
        &self.converter
    }

    /// The presenter.
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Mutable access to the presenter.
    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Consume the pipeline and return the presenter.
    pub fn into_presenter(self) -> P {
        self.presenter
    }

    /// Start over, as after replugging the device.
    pub fn reset(&mut self) {
        self.state.reset();
        self.store.discard_frame();
        self.converter.reset();
        self.monitor.reset();
    }
}
