//! End-to-end tests of the capture pipeline on synthesized streams.

use anacap::{
    CaptureConfig, CaptureError, CapturePipeline, FrameBuffer, PixelFormat, Presenter, Rational,
    SignalStatus, StreamSynthesizer, SyncOverrides, VideoStandard,
};

const GRAY_LINE: usize = 736;

#[derive(Default)]
struct Recorder {
    frames: Vec<(Vec<u8>, u64)>,
    lost: u32,
}

impl Recorder {
    fn repeats(&self) -> Vec<u64> {
        self.frames.iter().map(|(_, repeat)| *repeat).collect()
    }
}

impl Presenter for Recorder {
    fn present(&mut self, frame: &FrameBuffer, repeat_count: u64) {
        self.frames.push((frame.data().to_vec(), repeat_count));
    }

    fn signal_lost(&mut self) {
        self.lost += 1;
    }
}

/// Grayscale variant of a standard, to keep the streams small.
fn gray_config(standard: VideoStandard) -> CaptureConfig {
    CaptureConfig::new(standard, 32).with_sync(SyncOverrides {
        format: Some(PixelFormat::Gray8),
        line_bytes: Some(GRAY_LINE),
        timeout_lines: Some(4),
        ..Default::default()
    })
}

fn synthesizer(config: &CaptureConfig) -> StreamSynthesizer {
    StreamSynthesizer::from_config(&config.sync_config())
        .unwrap()
        .with_blanking_lines(config.standard.blanking_lines())
}

#[test]
fn test_ntsc_frames_reach_presenter() {
    let config = gray_config(VideoStandard::Ntsc);
    let mut synth = synthesizer(&config);
    let stream = synth.stream(3);

    let mut pipeline = CapturePipeline::new(&config, Recorder::default()).unwrap();
    assert_eq!(pipeline.push(&stream).unwrap(), SignalStatus::Locked);

    let recorder = pipeline.presenter();
    assert_eq!(recorder.frames.len(), 3);
    for (index, (data, _)) in recorder.frames.iter().enumerate() {
        assert_eq!(data.as_slice(), synth.expected_frame(index as u64).data());
    }

    let stats = pipeline.stats();
    assert_eq!(stats.bytes_in, stream.len() as u64);
    assert_eq!(stats.frames_presented, 3);
    assert_eq!(stats.sync.frames_completed, 3);
    assert_eq!(stats.sync.rows_written, 3 * 480);
}

#[test]
fn test_integer_ratio_doubles_every_frame() {
    let config = gray_config(VideoStandard::Ntsc).with_source_rate(Rational::from_int(30));
    let stream = synthesizer(&config).stream(4);

    let mut pipeline = CapturePipeline::new(&config, Recorder::default()).unwrap();
    pipeline.push(&stream).unwrap();

    assert_eq!(pipeline.presenter().repeats(), vec![2, 2, 2, 2]);
    assert_eq!(pipeline.stats().intervals_presented, 8);
    assert!(pipeline.converter().drift().is_zero());
}

#[test]
fn test_ntsc_to_60_paces_exactly() {
    let config = gray_config(VideoStandard::Ntsc);
    let stream = synthesizer(&config).stream(4);

    let mut pipeline = CapturePipeline::new(&config, Recorder::default()).unwrap();
    pipeline.push(&stream).unwrap();

    let repeats = pipeline.presenter().repeats();
    assert!(repeats.iter().all(|&r| r == 2 || r == 3));
    assert_eq!(
        repeats.iter().sum::<u64>(),
        pipeline.converter().frames_out()
    );
    assert_eq!(pipeline.converter().frames_in(), 4);
}

#[test]
fn test_downconversion_drops_frames() {
    let config = gray_config(VideoStandard::Pal).with_target_rate(Rational::from_int(20));
    let stream = synthesizer(&config).stream(5);

    let mut pipeline = CapturePipeline::new(&config, Recorder::default()).unwrap();
    pipeline.push(&stream).unwrap();

    assert_eq!(pipeline.presenter().repeats(), vec![0, 1, 1, 1, 1]);
    assert_eq!(pipeline.stats().frames_dropped, 1);
    assert_eq!(pipeline.stats().intervals_presented, 4);
}

#[test]
fn test_chunked_push_matches_single_push() {
    let config = gray_config(VideoStandard::Pal);
    let stream = synthesizer(&config).stream(2);

    let mut whole = CapturePipeline::new(&config, Recorder::default()).unwrap();
    whole.push(&stream).unwrap();

    let mut chunked = CapturePipeline::new(&config, Recorder::default()).unwrap();
    for chunk in stream.chunks(3071) {
        chunked.push(chunk).unwrap();
    }

    assert_eq!(chunked.stats(), whole.stats());
    assert_eq!(chunked.presenter().frames, whole.presenter().frames);
}

#[test]
fn test_no_signal_then_recovery() {
    let config = gray_config(VideoStandard::Ntsc).with_no_signal_after(2);
    let silence = vec![0x10u8; 4 * GRAY_LINE];

    let mut pipeline = CapturePipeline::new(&config, Recorder::default()).unwrap();
    assert_eq!(pipeline.push(&silence).unwrap(), SignalStatus::Searching);
    assert_eq!(pipeline.push(&silence).unwrap(), SignalStatus::NoSignal);
    assert!(matches!(
        pipeline.ensure_signal(),
        Err(CaptureError::NoSignal { timeouts: 2 })
    ));
    assert_eq!(pipeline.presenter().lost, 1);

    let stream = synthesizer(&config).stream(1);
    assert_eq!(pipeline.push(&stream).unwrap(), SignalStatus::Locked);
    assert!(pipeline.ensure_signal().is_ok());
    assert_eq!(pipeline.presenter().frames.len(), 1);
    assert_eq!(pipeline.presenter().lost, 1);
}

#[test]
fn test_reset_restarts_session() {
    let config = gray_config(VideoStandard::Pal);
    let stream = synthesizer(&config).stream(1);

    let mut pipeline = CapturePipeline::new(&config, Recorder::default()).unwrap();
    pipeline.push(&stream).unwrap();
    assert!(pipeline.state().is_locked());

    pipeline.reset();
    assert!(!pipeline.state().is_locked());
    assert_eq!(pipeline.status(), SignalStatus::Searching);
    assert_eq!(pipeline.converter().frames_in(), 0);
}

#[test]
fn test_pipeline_from_json() {
    let json = r#"{
        "standard": "pal",
        "discard_budget": 16,
        "target_rate": [50, 1],
        "sync": { "format": "gray8", "line_bytes": 736 }
    }"#;
    let config = CaptureConfig::from_json(json).unwrap();
    let stream = synthesizer(&config).stream(2);

    let mut recorder = Recorder::default();
    let mut pipeline = CapturePipeline::new(&config, &mut recorder).unwrap();
    pipeline.push(&stream).unwrap();
    drop(pipeline);

    assert_eq!(recorder.repeats(), vec![2, 2]);
}
