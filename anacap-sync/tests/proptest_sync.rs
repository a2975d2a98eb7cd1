//! Property-based tests for the stream synchronizer.
//!
//! The synchronizer must end up in the same place however the stream is cut
//! into chunks, since USB transfers never line up with the video structure.

use anacap_core::{FrameGeometry, FrameStore, PixelFormat};
use anacap_sync::{StreamSynthesizer, SyncConfig, SyncState, Synchronizer};
use proptest::prelude::*;

const LINE: usize = 40;

fn synchronizer() -> Synchronizer {
    let geometry = FrameGeometry::new(12, 6, PixelFormat::Gray8);
    let config = SyncConfig::new(geometry, LINE, 6).with_timeout_lines(3);
    Synchronizer::new(config).unwrap()
}

fn stream(frames: usize, prefix: &[u8]) -> Vec<u8> {
    let sync = synchronizer();
    let mut synth = StreamSynthesizer::from_config(sync.config())
        .unwrap()
        .with_blanking_lines(2);
    let mut data = prefix.to_vec();
    data.extend(synth.stream(frames));
    data
}

/// Run `data` through a fresh synchronizer, cut at the given chunk sizes.
fn run(data: &[u8], chunks: &[usize]) -> (SyncState, FrameStore) {
    let sync = synchronizer();
    let mut state = SyncState::new();
    let mut store = FrameStore::new(sync.config().geometry);

    let mut rest = data;
    let mut sizes = chunks.iter().cycle();
    while !rest.is_empty() {
        let size = sizes.next().copied().unwrap_or(rest.len()).clamp(1, rest.len());
        let (chunk, tail) = rest.split_at(size);
        // Timeouts are expected on garbage input and leave the state usable
        let _ = sync.process(&mut state, chunk, &mut store);
        rest = tail;
    }
    (state, store)
}

fn assert_same(
    (whole_state, whole_store): &(SyncState, FrameStore),
    (split_state, split_store): &(SyncState, FrameStore),
) -> Result<(), TestCaseError> {
    prop_assert_eq!(whole_state.totals(), split_state.totals());
    prop_assert_eq!(whole_state.is_locked(), split_state.is_locked());
    prop_assert_eq!(whole_state.offset(), split_state.offset());
    prop_assert_eq!(whole_store.frames_completed(), split_store.frames_completed());
    prop_assert_eq!(whole_store.frames_discarded(), split_store.frames_discarded());
    prop_assert_eq!(whole_store.bytes_written(), split_store.bytes_written());
    prop_assert_eq!(
        whole_store.latest().map(|f| f.data().to_vec()),
        split_store.latest().map(|f| f.data().to_vec())
    );
    prop_assert_eq!(whole_store.pending().data(), split_store.pending().data());
    Ok(())
}

// =============================================================================
// Chunk Boundary Tests
// =============================================================================

proptest! {
    /// A valid stream decodes identically for any chunking.
    #[test]
    fn chunking_does_not_change_output(
        frames in 1usize..4,
        chunks in prop::collection::vec(1usize..90, 1..16),
    ) {
        let data = stream(frames, &[]);
        let whole = run(&data, &[data.len()]);
        let split = run(&data, &chunks);

        prop_assert_eq!(whole.0.totals().frames_completed, frames as u64);
        assert_same(&whole, &split)?;
    }

    /// Garbage before the signal does not make chunking matter either.
    #[test]
    fn chunking_with_noise_prefix(
        prefix in prop::collection::vec(any::<u8>(), 0..300),
        chunks in prop::collection::vec(1usize..60, 1..16),
    ) {
        let data = stream(2, &prefix);
        let whole = run(&data, &[data.len()]);
        let split = run(&data, &chunks);
        assert_same(&whole, &split)?;
    }

    /// Arbitrary bytes never panic and still decode the same way per chunking.
    #[test]
    fn chunking_arbitrary_bytes(
        data in prop::collection::vec(any::<u8>(), 0..2000),
        chunks in prop::collection::vec(1usize..50, 1..8),
    ) {
        let whole = run(&data, &[data.len().max(1)]);
        let split = run(&data, &chunks);
        assert_same(&whole, &split)?;
    }

    /// Byte-at-a-time delivery is the worst case for the marker carry.
    #[test]
    fn single_byte_chunks(frames in 1usize..3) {
        let data = stream(frames, &[0x80, 0x10, 0xFF, 0x00]);
        let whole = run(&data, &[data.len()]);
        let split = run(&data, &[1]);
        assert_same(&whole, &split)?;
    }
}
