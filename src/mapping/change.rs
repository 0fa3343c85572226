//! Change detection
//!
//! Suppresses output until a control's raw value has moved more than its
//! threshold away from the last value that passed. The anchor only moves
//! when a change passes, so slow drift below the threshold accumulates
//! until it fires instead of being lost.

use super::RawValue;
use crate::engine::JoystickMode;

#[derive(Debug, Clone)]
pub struct ChangeDetector {
    last: RawValue,
    threshold: f64,
    /// Pass the next value regardless of distance
    stale: bool,
}

impl ChangeDetector {
    pub fn new(initial: RawValue, threshold: f64) -> Self {
        Self {
            last: initial,
            threshold,
            stale: false,
        }
    }

    /// True when `raw` differs from the anchor by more than the threshold.
    ///
    /// A distance equal to the threshold does not pass, so repeating a value
    /// never passes even at threshold 0.
    pub fn exceeds(&self, raw: &RawValue, mode: JoystickMode) -> bool {
        self.stale || raw.distance(&self.last, mode) > self.threshold
    }

    /// Move the anchor to `raw`
    pub fn record(&mut self, raw: RawValue) {
        self.last = raw;
        self.stale = false;
    }

    /// Force the next value through, e.g. after the output it drives moved
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub fn last(&self) -> RawValue {
        self.last
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODE: JoystickMode = JoystickMode::TwoAxis;

    #[test]
    fn test_repeat_never_passes() {
        let mut detector = ChangeDetector::new(RawValue::Scalar(0.0), 0.0);

        assert!(detector.exceeds(&RawValue::Scalar(0.4), MODE));
        detector.record(RawValue::Scalar(0.4));
        assert!(!detector.exceeds(&RawValue::Scalar(0.4), MODE));
    }

    #[test]
    fn test_hysteresis_anchor() {
        let detector = ChangeDetector::new(RawValue::Scalar(10.0), 1.0);

        // Oscillating around the anchor below threshold never fires
        assert!(!detector.exceeds(&RawValue::Scalar(10.9), MODE));
        assert!(!detector.exceeds(&RawValue::Scalar(9.1), MODE));
        assert!(!detector.exceeds(&RawValue::Scalar(11.0), MODE));
        assert!(detector.exceeds(&RawValue::Scalar(11.01), MODE));
    }

    #[test]
    fn test_invalidate_forces_one_pass() {
        let mut detector = ChangeDetector::new(RawValue::Scalar(3.0), 0.5);
        detector.invalidate();

        assert!(detector.exceeds(&RawValue::Scalar(3.0), MODE));
        detector.record(RawValue::Scalar(3.0));
        assert!(!detector.exceeds(&RawValue::Scalar(3.0), MODE));
    }
}
