//! Raw control values

use crate::engine::JoystickMode;

/// A device-derived value before any scaling
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue {
    /// Momentary button state
    Switch(bool),
    /// Single analog reading (angle, stick axis)
    Scalar(f64),
    /// Two-axis stick reading
    Vector2 { h: f64, v: f64 },
}

impl RawValue {
    /// Distance used for change suppression.
    ///
    /// Vectors compare per axis in two-axis mode and by magnitude in
    /// absolute-offset mode. Values of different shapes are infinitely far
    /// apart.
    pub fn distance(&self, other: &RawValue, mode: JoystickMode) -> f64 {
        match (*self, *other) {
            (RawValue::Switch(a), RawValue::Switch(b)) => {
                if a == b {
                    0.0
                } else {
                    1.0
                }
            }
            (RawValue::Scalar(a), RawValue::Scalar(b)) => (a - b).abs(),
            (RawValue::Vector2 { h: h1, v: v1 }, RawValue::Vector2 { h: h2, v: v2 }) => match mode {
                JoystickMode::TwoAxis => (h1 - h2).abs().max((v1 - v2).abs()),
                JoystickMode::AbsoluteOffset => (h1.hypot(v1) - h2.hypot(v2)).abs(),
            },
            _ => f64::INFINITY,
        }
    }

    /// Boolean view. Scalars count as pressed from 0.5 up.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            RawValue::Switch(b) => Some(b),
            RawValue::Scalar(x) => Some(x >= 0.5),
            RawValue::Vector2 { .. } => None,
        }
    }

    /// Scalar view. Switches read as 0.0 / 1.0.
    pub fn as_scalar(&self) -> Option<f64> {
        match *self {
            RawValue::Switch(b) => Some(if b { 1.0 } else { 0.0 }),
            RawValue::Scalar(x) => Some(x),
            RawValue::Vector2 { .. } => None,
        }
    }

    pub fn as_vector(&self) -> Option<(f64, f64)> {
        match *self {
            RawValue::Vector2 { h, v } => Some((h, v)),
            _ => None,
        }
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Switch(b)
    }
}

impl From<f64> for RawValue {
    fn from(x: f64) -> Self {
        RawValue::Scalar(x)
    }
}

/// Scale a normalized value to a 0-127 intensity.
///
/// Clamps before rounding, so out-of-range input saturates instead of
/// wrapping. NaN maps to 0.
pub fn intensity(normalized: f64) -> u8 {
    if normalized.is_nan() {
        return 0;
    }
    (normalized * 127.0).clamp(0.0, 127.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_range() {
        assert_eq!(intensity(0.0), 0);
        assert_eq!(intensity(0.5), 64);
        assert_eq!(intensity(1.0), 127);
    }

    #[test]
    fn test_intensity_clamps_out_of_domain() {
        assert_eq!(intensity(-0.3), 0);
        assert_eq!(intensity(1.004), 127);
        assert_eq!(intensity(7.0), 127);
        assert_eq!(intensity(f64::INFINITY), 127);
        assert_eq!(intensity(f64::NEG_INFINITY), 0);
        assert_eq!(intensity(f64::NAN), 0);
    }

    #[test]
    fn test_intensity_matches_rounded_product() {
        for i in 0..=1000 {
            let n = i as f64 / 1000.0;
            let expected = (127.0 * n).round().clamp(0.0, 127.0) as u8;
            assert_eq!(intensity(n), expected, "normalized {}", n);
        }
    }

    #[test]
    fn test_scalar_distance() {
        let a = RawValue::Scalar(1.5);
        let b = RawValue::Scalar(-0.5);
        assert_eq!(a.distance(&b, JoystickMode::TwoAxis), 2.0);
        assert_eq!(a.distance(&a, JoystickMode::TwoAxis), 0.0);
    }

    #[test]
    fn test_switch_distance() {
        let on = RawValue::from(true);
        let off = RawValue::from(false);
        assert_eq!(on.distance(&off, JoystickMode::TwoAxis), 1.0);
        assert_eq!(on.distance(&on, JoystickMode::TwoAxis), 0.0);
    }

    #[test]
    fn test_vector_distance_modes() {
        let a = RawValue::Vector2 { h: 0.3, v: 0.0 };
        let b = RawValue::Vector2 { h: 0.0, v: 0.3 };

        // Per-axis: both axes moved by 0.3
        assert!((a.distance(&b, JoystickMode::TwoAxis) - 0.3).abs() < 1e-12);
        // Same distance from center
        assert!(a.distance(&b, JoystickMode::AbsoluteOffset) < 1e-12);
    }

    #[test]
    fn test_mismatched_shapes_always_differ() {
        let a = RawValue::Scalar(0.0);
        let b = RawValue::Vector2 { h: 0.0, v: 0.0 };
        assert!(a.distance(&b, JoystickMode::TwoAxis).is_infinite());
    }
}
