#![no_main]

use anacap_core::{FrameGeometry, FrameStorage, FrameStore, PixelFormat};
use anacap_sync::{SyncConfig, SyncState, Synchronizer};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct SyncInput {
    data: Vec<u8>,
    chunk_sizes: Vec<u8>,
    tolerance: u8,
}

fuzz_target!(|input: SyncInput| {
    let geometry = FrameGeometry::new(8, 6, PixelFormat::Gray8);
    let config = SyncConfig::new(geometry, 24, 6)
        .with_line_tolerance((input.tolerance % 4) as usize)
        .with_timeout_lines(2);
    let Ok(sync) = Synchronizer::new(config) else {
        return;
    };

    let mut whole_state = SyncState::new();
    let mut whole = FrameStore::new(geometry);
    let _ = sync.process(&mut whole_state, &input.data, &mut whole);

    let mut state = SyncState::new();
    let mut store = FrameStore::new(geometry);
    let mut rest = input.data.as_slice();
    for size in input.chunk_sizes.iter().cycle().take(rest.len()) {
        if rest.is_empty() {
            break;
        }
        let n = (*size as usize).clamp(1, rest.len());
        let (chunk, tail) = rest.split_at(n);
        let _ = sync.process(&mut state, chunk, &mut store);
        rest = tail;
    }
    if !rest.is_empty() {
        let _ = sync.process(&mut state, rest, &mut store);
    }

    // Chunking must not change what is decoded.
    assert_eq!(state.totals(), whole_state.totals());
    assert_eq!(state.is_locked(), whole_state.is_locked());
    assert_eq!(store.frames_completed(), whole.frames_completed());
    assert_eq!(store.frames_discarded(), whole.frames_discarded());
    assert_eq!(store.pending().data(), whole.pending().data());
    assert_eq!(store.geometry(), whole.geometry());
});
