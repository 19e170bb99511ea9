use proptest::prelude::*;

use wakesight_detection_core::diff::diff_frames;
use wakesight_detection_core::{MotionAnalyzer, RegionSums};
use wakesight_motion_model::{MotionDirection, PixelBuffer, Sensitivity};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;

fn top_third_scenario() -> (PixelBuffer, PixelBuffer) {
    let previous = PixelBuffer::filled(WIDTH, HEIGHT, [80, 80, 80, 255]);
    let current = PixelBuffer::from_fn(WIDTH, HEIGHT, |_, y| {
        if 3 * y < HEIGHT {
            // +20 red, +20 green: per-pixel diff of 40
            [100, 100, 80, 255]
        } else {
            [80, 80, 80, 255]
        }
    });
    (previous, current)
}

#[test]
fn top_third_change_is_upward_motion() {
    let (previous, current) = top_third_scenario();
    let mut analyzer = MotionAnalyzer::new();

    let first = analyzer.analyze(previous, Sensitivity::High);
    assert!(first.baseline);

    let assessment = analyzer.analyze(current, Sensitivity::High);
    assert!(assessment.is_motion_detected);
    assert_eq!(assessment.direction, MotionDirection::Up);
    assert_eq!(assessment.threshold, 15);
    assert_eq!(assessment.moved_pixel_count, (WIDTH * HEIGHT / 3) as u64);
    // Raw intensity drives detection; the exposed value is raw / 100.
    assert_eq!(assessment.raw_intensity, 40.0);
    assert!((assessment.motion_intensity - 0.4).abs() < 1e-12);
    assert!((assessment.confidence_level - 0.8).abs() < 1e-12);
    assert!(assessment.exceeds_auto_wake());
}

#[test]
fn top_third_change_is_invisible_at_low_sensitivity() {
    let (previous, current) = top_third_scenario();
    let mut analyzer = MotionAnalyzer::new();
    analyzer.analyze(previous, Sensitivity::Low);

    let assessment = analyzer.analyze(current, Sensitivity::Low);
    assert!(!assessment.is_motion_detected);
    assert_eq!(assessment.direction, MotionDirection::None);
    assert_eq!(assessment.motion_intensity, 0.0);
}

#[test]
fn identical_consecutive_frames_are_still() {
    let frame = PixelBuffer::from_fn(WIDTH, HEIGHT, |x, y| {
        [(x % 256) as u8, (y % 256) as u8, 7, 255]
    });
    let mut analyzer = MotionAnalyzer::new();
    analyzer.analyze(frame.clone(), Sensitivity::High);

    let assessment = analyzer.analyze(frame, Sensitivity::High);
    assert!(!assessment.baseline);
    assert!(!assessment.is_motion_detected);
    assert_eq!(assessment.direction, MotionDirection::None);
    assert_eq!(assessment.motion_intensity, 0.0);
    assert_eq!(assessment.confidence_level, 0.0);
}

fn frame_pair() -> impl Strategy<Value = (PixelBuffer, PixelBuffer)> {
    (1u32..24, 1u32..24).prop_flat_map(|(w, h)| {
        let len = (w * h * 4) as usize;
        (
            proptest::collection::vec(any::<u8>(), len),
            proptest::collection::vec(any::<u8>(), len),
        )
            .prop_map(move |(a, b)| {
                (
                    PixelBuffer::new(w, h, a).expect("length matches geometry"),
                    PixelBuffer::new(w, h, b).expect("length matches geometry"),
                )
            })
    })
}

fn sensitivity() -> impl Strategy<Value = Sensitivity> {
    prop_oneof![
        Just(Sensitivity::Low),
        Just(Sensitivity::Medium),
        Just(Sensitivity::High),
    ]
}

proptest! {
    #[test]
    fn exposed_values_stay_in_unit_range((previous, current) in frame_pair(), level in sensitivity()) {
        let mut analyzer = MotionAnalyzer::new();
        analyzer.analyze(previous, level);
        let assessment = analyzer.analyze(current, level);

        prop_assert!((0.0..=1.0).contains(&assessment.motion_intensity));
        prop_assert!((0.0..=1.0).contains(&assessment.confidence_level));
        prop_assert!(assessment.raw_intensity >= 0.0);
    }

    #[test]
    fn direction_is_none_without_motion((previous, current) in frame_pair(), level in sensitivity()) {
        let mut analyzer = MotionAnalyzer::new();
        analyzer.analyze(previous, level);
        let assessment = analyzer.analyze(current, level);

        if !assessment.is_motion_detected {
            prop_assert_eq!(assessment.direction, MotionDirection::None);
            prop_assert_eq!(assessment.moved_pixel_count, 0);
        }
    }

    #[test]
    fn dominant_band_has_the_largest_sum((previous, current) in frame_pair()) {
        let report = diff_frames(&current, &previous, 15).expect("same geometry");
        let sums = RegionSums::from_map(&report.map);
        let max = sums.left.max(sums.right).max(sums.up).max(sums.down);
        let winner = match sums.dominant() {
            MotionDirection::Left => sums.left,
            MotionDirection::Right => sums.right,
            MotionDirection::Up => sums.up,
            MotionDirection::Down => sums.down,
            MotionDirection::None => 0,
        };
        prop_assert_eq!(winner, max);
    }
}
