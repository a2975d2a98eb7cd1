//! Property-based tests for frame repeat scheduling.
//!
//! Uses proptest to check that repeat counts never drift from the exact
//! rate ratio, however long the schedule runs.

use anacap_core::Rational;
use anacap_framerate::{FrameRateConverter, FrameRepeatSchedule, StandardFrameRate};
use proptest::prelude::*;

fn rate(num: i64, den: i64) -> Rational {
    Rational::new(num, den).unwrap()
}

// =============================================================================
// Fixed Cadences
// =============================================================================

#[test]
fn thirty_to_sixty_is_always_two() {
    let mut converter = FrameRateConverter::new(rate(30, 1), rate(60, 1)).unwrap();
    for _ in 0..10_000 {
        assert_eq!(converter.next_frame_repeat_count(), 2);
    }
    assert_eq!(converter.frames_out(), 20_000);
    assert!(converter.drift().is_zero());
}

#[test]
fn every_standard_pair_cycles_exactly() {
    for source in StandardFrameRate::ALL {
        for target in StandardFrameRate::ALL {
            let schedule = FrameRepeatSchedule::new(source.to_rational(), target.to_rational())
                .unwrap();
            let total: u64 = schedule.cadence().sum();
            assert_eq!(total, schedule.cycle_intervals(), "{source} -> {target}");
            if target.to_rational() >= source.to_rational() {
                assert!(schedule.cadence().all(|n| n >= 1), "{source} -> {target}");
            }
        }
    }
}

// =============================================================================
// Window Bounds
// =============================================================================

proptest! {
    /// Any window of N counts from 23.976 to 60 sums to within one interval
    /// of N * 60 * 1001 / 24000.
    #[test]
    fn ntsc_film_windows_stay_within_one(start in 0usize..5000, len in 1usize..2000) {
        let mut schedule = FrameRepeatSchedule::new(rate(24000, 1001), rate(60, 1)).unwrap();
        let counts: Vec<u64> = schedule.by_ref().skip(start).take(len).collect();
        let sum = counts.iter().sum::<u64>() as i128;

        // Compare sum against len * 60060 / 24000 without rounding
        let ideal_num = len as i128 * 60 * 1001;
        let ideal_den = 24000i128;
        prop_assert!((sum * ideal_den - ideal_num).abs() < ideal_den);
    }

    /// The same bound holds for arbitrary positive rates.
    #[test]
    fn arbitrary_rate_windows_stay_within_one(
        sn in 1i64..200_000, sd in 1i64..2000,
        tn in 1i64..200_000, td in 1i64..2000,
        start in 0usize..500, len in 1usize..500,
    ) {
        let source = rate(sn, sd);
        let target = rate(tn, td);
        let mut schedule = FrameRepeatSchedule::new(source, target).unwrap();
        let ratio = schedule.ratio();

        let sum = schedule.by_ref().skip(start).take(len).sum::<u64>() as i128;
        let ideal_num = len as i128 * ratio.num() as i128;
        let ideal_den = ratio.den() as i128;
        prop_assert!((sum * ideal_den - ideal_num).abs() < ideal_den);
    }

    /// Cumulative output is always floor(frames * ratio).
    #[test]
    fn cumulative_output_is_exact(
        sn in 1i64..100_000, sd in 1i64..1001,
        tn in 1i64..100_000, td in 1i64..1001,
        frames in 1u64..3000,
    ) {
        let mut converter = FrameRateConverter::new(rate(sn, sd), rate(tn, td)).unwrap();
        for _ in 0..frames {
            converter.next_frame_repeat_count();
        }
        let ratio = converter.ratio();
        let expected = (frames as i128 * ratio.num() as i128) / ratio.den() as i128;
        prop_assert_eq!(converter.frames_out() as i128, expected);

        let drift = converter.drift();
        prop_assert!(drift <= Rational::zero());
        prop_assert!(drift > Rational::from_int(-1));
    }

    /// Only downconversion drops frames.
    #[test]
    fn upconversion_never_drops(
        sn in 1i64..100_000, sd in 1i64..1001,
        extra in 0i64..100_000, frames in 1usize..2000,
    ) {
        let source = rate(sn, sd);
        let target = source + rate(extra, sd);
        let schedule = FrameRepeatSchedule::new(source, target).unwrap();
        prop_assert!(schedule.take(frames).all(|n| n >= 1));

        let faster = source + rate(extra + 1, sd);
        let mut schedule = FrameRepeatSchedule::new(faster, source).unwrap();
        let cycle = schedule.cycle_len() as usize;
        prop_assert!(schedule.by_ref().take(cycle).any(|n| n == 0));
    }

    /// Peeking never changes what comes next.
    #[test]
    fn current_count_matches_next(sn in 1i64..1000, tn in 1i64..1000, steps in 0usize..50) {
        let mut converter = FrameRateConverter::new(rate(sn, 1), rate(tn, 1)).unwrap();
        for _ in 0..steps {
            converter.next_frame_repeat_count();
        }
        let mut fresh = converter.clone();
        fresh.reset();
        let upcoming = converter.schedule().peek();
        prop_assert_eq!(converter.next_frame_repeat_count(), upcoming);
        prop_assert_eq!(converter.current_frame_repeat_count(), upcoming);
        prop_assert_eq!(fresh.current_frame_repeat_count(), fresh.next_frame_repeat_count());
    }
}
