//! Composite joystick codec
//!
//! Encodes a two-axis stick reading either as one controller per axis or as
//! a single distance-from-center controller with a dead zone.

use std::f64::consts::SQRT_2;

use super::{intensity, Codec, RawValue};
use crate::engine::{JoystickMode, MidiMessage, RuntimeConfig};

pub struct JoystickCodec {
    horizontal: u8,
    vertical: u8,
    /// Largest distance from center either axis is expected to reach
    max_deviation: f64,
    /// Inside the dead zone with the zero already sent
    resting: bool,
}

impl JoystickCodec {
    /// `min`/`max` are the stick's observed extremes; the deviation bound is
    /// the larger of their magnitudes so both directions share one scale.
    pub fn new(horizontal: u8, vertical: u8, min: f64, max: f64) -> Self {
        Self {
            horizontal,
            vertical,
            max_deviation: min.abs().max(max.abs()),
            resting: false,
        }
    }

    pub fn max_deviation(&self) -> f64 {
        self.max_deviation
    }

    /// Map one axis from `[-dev, dev]` to `[0, 1]`, center at 0.5
    fn axis(&self, x: f64) -> f64 {
        let dev = self.max_deviation;
        (x.clamp(-dev, dev) + dev) / (2.0 * dev)
    }

    /// Distance from center, 1.0 at a full diagonal
    fn magnitude(&self, h: f64, v: f64) -> f64 {
        h.hypot(v) / (SQRT_2 * self.max_deviation)
    }
}

impl Codec for JoystickCodec {
    fn kind(&self) -> &'static str {
        "joystick"
    }

    fn encode(&mut self, raw: &RawValue, runtime: &RuntimeConfig) -> Vec<MidiMessage> {
        let Some((h, v)) = raw.as_vector() else {
            return Vec::new();
        };
        if self.max_deviation < f64::EPSILON {
            return Vec::new();
        }
        let scale = runtime.joystick_scale();

        match runtime.joystick_mode {
            JoystickMode::TwoAxis => {
                self.resting = false;
                vec![
                    MidiMessage::cc(self.horizontal, intensity(self.axis(h) * scale)),
                    MidiMessage::cc(self.vertical, intensity(self.axis(v) * scale)),
                ]
            }
            JoystickMode::AbsoluteOffset => {
                let magnitude = self.magnitude(h, v);
                if magnitude < runtime.dead_zone {
                    if self.resting {
                        return Vec::new();
                    }
                    self.resting = true;
                    vec![MidiMessage::cc(runtime.channel, 0)]
                } else {
                    self.resting = false;
                    vec![MidiMessage::cc(runtime.channel, intensity(magnitude * scale))]
                }
            }
        }
    }

    /// Only the absolute-offset output goes to the runtime channel
    fn follows_channel(&self, runtime: &RuntimeConfig) -> bool {
        runtime.joystick_mode == JoystickMode::AbsoluteOffset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn absolute() -> RuntimeConfig {
        RuntimeConfig {
            joystick_mode: JoystickMode::AbsoluteOffset,
            ..RuntimeConfig::default()
        }
    }

    fn stick(h: f64, v: f64) -> RawValue {
        RawValue::Vector2 { h, v }
    }

    #[test]
    fn test_deviation_from_extremes() {
        let codec = JoystickCodec::new(13, 14, -1.2, 1.4);
        assert_eq!(codec.max_deviation(), 1.4);
    }

    #[test]
    fn test_channel_following_depends_on_mode() {
        let codec = JoystickCodec::new(13, 14, -1.2, 1.4);
        assert!(!codec.follows_channel(&RuntimeConfig::default()));
        assert!(codec.follows_channel(&absolute()));
        assert!(!codec.reads_bend());
    }

    #[test]
    fn test_two_axis_messages() {
        let mut codec = JoystickCodec::new(13, 14, -1.0, 1.0);
        let runtime = RuntimeConfig::default();

        let msgs = codec.encode(&stick(1.0, -1.0), &runtime);
        assert_eq!(msgs, vec![MidiMessage::cc(13, 127), MidiMessage::cc(14, 0)]);

        let msgs = codec.encode(&stick(0.0, 0.0), &runtime);
        assert_eq!(msgs, vec![MidiMessage::cc(13, 64), MidiMessage::cc(14, 64)]);
    }

    #[test]
    fn test_two_axis_increment_scale() {
        let mut codec = JoystickCodec::new(13, 14, -1.0, 1.0);
        let runtime = RuntimeConfig {
            joystick_increment: 6,
            ..RuntimeConfig::default()
        };

        let msgs = codec.encode(&stick(1.0, 1.0), &runtime);
        assert_eq!(msgs, vec![MidiMessage::cc(13, 64), MidiMessage::cc(14, 64)]);
    }

    #[test]
    fn test_absolute_offset_full_diagonal() {
        let mut codec = JoystickCodec::new(13, 14, -1.0, 1.0);
        let msgs = codec.encode(&stick(1.0, 1.0), &absolute());
        assert_eq!(msgs, vec![MidiMessage::cc(12, 127)]);
    }

    #[test]
    fn test_dead_zone_forces_zero() {
        let mut codec = JoystickCodec::new(13, 14, -1.0, 1.0);
        let runtime = absolute();

        // magnitude 0.09 / sqrt(2) is well inside the dead zone
        let msgs = codec.encode(&stick(0.09, 0.0), &runtime);
        assert_eq!(msgs, vec![MidiMessage::cc(12, 0)]);
    }

    #[test]
    fn test_dead_zone_zero_sent_once() {
        let mut codec = JoystickCodec::new(13, 14, -1.0, 1.0);
        let runtime = absolute();

        let out = codec.encode(&stick(0.8, 0.8), &runtime);
        assert_eq!(out.len(), 1);
        assert!(out[0].value() > 0);

        assert_eq!(codec.encode(&stick(0.05, 0.0), &runtime), vec![MidiMessage::cc(12, 0)]);
        assert!(codec.encode(&stick(0.0, 0.05), &runtime).is_empty());
        assert!(codec.encode(&stick(0.0, 0.0), &runtime).is_empty());

        // Leaving and re-entering sends one more zero
        assert_eq!(codec.encode(&stick(0.5, 0.0), &runtime).len(), 1);
        assert_eq!(codec.encode(&stick(0.0, 0.0), &runtime), vec![MidiMessage::cc(12, 0)]);
    }
}
