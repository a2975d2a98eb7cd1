#![no_main]

use anacap_core::Rational;
use anacap_framerate::FrameRepeatSchedule;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (i64, i64, i64, i64, u16)| {
    let (sn, sd, tn, td, frames) = input;
    let (Ok(source), Ok(target)) = (Rational::new(sn, sd), Rational::new(tn, td)) else {
        return;
    };
    let Ok(mut schedule) = FrameRepeatSchedule::new(source, target) else {
        return;
    };

    for _ in 0..frames {
        schedule.next_count();
        let drift = schedule.drift();
        assert!(drift <= Rational::zero());
        assert!(drift > Rational::from_int(-1));
    }
});
