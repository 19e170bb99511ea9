//! One-call motion analysis over a stream of frames.

use wakesight_motion_model::{MotionDirection, PixelBuffer, Sensitivity};

use crate::diff::{DiffEngine, DiffOutcome};
use crate::direction::classify_direction;
use crate::threshold::{auto_wake_threshold, threshold};

/// Result of analysing a single frame against its predecessor.
///
/// `raw_intensity` is the unnormalized mean moved difference; it is what
/// motion detection and auto-wake compare against. `motion_intensity` and
/// `confidence_level` are the clamped values exposed to observers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionAssessment {
    pub threshold: u32,
    pub baseline: bool,
    pub is_motion_detected: bool,
    pub raw_intensity: f64,
    pub motion_intensity: f64,
    pub confidence_level: f64,
    pub direction: MotionDirection,
    pub moved_pixel_count: u64,
}

impl MotionAssessment {
    fn baseline(threshold: u32) -> Self {
        Self {
            threshold,
            baseline: true,
            is_motion_detected: false,
            raw_intensity: 0.0,
            motion_intensity: 0.0,
            confidence_level: 0.0,
            direction: MotionDirection::None,
            moved_pixel_count: 0,
        }
    }

    /// Whether this assessment is strong enough to wake a sleeping consumer.
    pub fn exceeds_auto_wake(&self) -> bool {
        self.is_motion_detected && self.raw_intensity > (2 * self.threshold) as f64
    }
}

/// Combines the diff engine and direction classifier.
#[derive(Debug, Default)]
pub struct MotionAnalyzer {
    engine: DiffEngine,
}

impl MotionAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyse `frame` using the threshold for `sensitivity`, then retain it.
    pub fn analyze(&mut self, frame: PixelBuffer, sensitivity: Sensitivity) -> MotionAssessment {
        let threshold = threshold(sensitivity);

        let report = match self.engine.compare(frame, threshold) {
            DiffOutcome::Baseline => return MotionAssessment::baseline(threshold),
            DiffOutcome::Compared(report) => report,
        };

        let is_motion_detected = report.is_motion_detected();
        let direction = if is_motion_detected {
            classify_direction(&report.map)
        } else {
            MotionDirection::None
        };

        let assessment = MotionAssessment {
            threshold,
            baseline: false,
            is_motion_detected,
            raw_intensity: report.raw_intensity(),
            motion_intensity: report.motion_intensity(),
            confidence_level: report.confidence_level(),
            direction,
            moved_pixel_count: report.moved_pixel_count,
        };

        tracing::trace!(
            %sensitivity,
            threshold,
            raw_intensity = assessment.raw_intensity,
            moved = assessment.moved_pixel_count,
            direction = %assessment.direction,
            auto_wake_threshold = auto_wake_threshold(sensitivity),
            "Frame analysed"
        );

        assessment
    }

    pub fn has_baseline(&self) -> bool {
        self.engine.has_previous()
    }

    /// Discard the retained frame; the next frame becomes a new baseline.
    pub fn reset(&mut self) {
        self.engine.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_reports_zero_motion() {
        let mut analyzer = MotionAnalyzer::new();
        let assessment =
            analyzer.analyze(PixelBuffer::filled(16, 12, [9, 9, 9, 255]), Sensitivity::High);
        assert!(assessment.baseline);
        assert!(!assessment.is_motion_detected);
        assert_eq!(assessment.motion_intensity, 0.0);
        assert_eq!(assessment.direction, MotionDirection::None);
        assert!(analyzer.has_baseline());
    }

    #[test]
    fn sensitivity_is_read_per_call() {
        let dark = PixelBuffer::filled(6, 6, [100, 100, 100, 255]);
        let lit = PixelBuffer::filled(6, 6, [140, 100, 100, 255]);

        let mut analyzer = MotionAnalyzer::new();
        analyzer.analyze(dark.clone(), Sensitivity::Low);
        // diff 40 is below the low threshold of 50
        let low = analyzer.analyze(lit.clone(), Sensitivity::Low);
        assert!(!low.is_motion_detected);
        assert_eq!(low.threshold, 50);

        analyzer.analyze(dark, Sensitivity::High);
        let high = analyzer.analyze(lit, Sensitivity::High);
        assert!(high.is_motion_detected);
        assert_eq!(high.threshold, 15);
    }

    #[test]
    fn auto_wake_requires_double_threshold() {
        let mut assessment = MotionAssessment::baseline(15);
        assessment.baseline = false;
        assessment.is_motion_detected = true;

        assessment.raw_intensity = 30.0;
        assert!(!assessment.exceeds_auto_wake());
        assessment.raw_intensity = 30.5;
        assert!(assessment.exceeds_auto_wake());

        assessment.is_motion_detected = false;
        assert!(!assessment.exceeds_auto_wake());
    }

    #[test]
    fn reset_makes_next_frame_a_baseline() {
        let mut analyzer = MotionAnalyzer::new();
        analyzer.analyze(PixelBuffer::filled(4, 4, [0, 0, 0, 255]), Sensitivity::Medium);
        analyzer.reset();
        let next = analyzer.analyze(
            PixelBuffer::filled(4, 4, [255, 0, 0, 255]),
            Sensitivity::Medium,
        );
        assert!(next.baseline);
    }
}
