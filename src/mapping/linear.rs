//! Linear scalar codecs

use super::{intensity, Codec, RawValue};
use crate::engine::{MidiMessage, RuntimeConfig};

/// Rescales a value in `[in_min, in_max]` to a 0-127 controller value
pub struct LinearCodec {
    controller: u8,
    in_min: f64,
    in_max: f64,
}

impl LinearCodec {
    /// Create a new linear codec
    pub fn new(controller: u8, in_min: f64, in_max: f64) -> Self {
        Self {
            controller,
            in_min,
            in_max,
        }
    }
}

/// Position of `input` within `[min, max]`, unclamped.
///
/// `None` for an empty range.
pub fn normalize(input: f64, min: f64, max: f64) -> Option<f64> {
    let range = max - min;
    if range.abs() < f64::EPSILON {
        None
    } else {
        Some((input - min) / range)
    }
}

impl Codec for LinearCodec {
    fn kind(&self) -> &'static str {
        "linear"
    }

    fn encode(&mut self, raw: &RawValue, _runtime: &RuntimeConfig) -> Vec<MidiMessage> {
        raw.as_scalar()
            .and_then(|x| normalize(x, self.in_min, self.in_max))
            .map(|n| vec![MidiMessage::cc(self.controller, intensity(n))])
            .unwrap_or_default()
    }
}

/// The bend control: the configured orientation axis between the runtime
/// bend bounds, scaled by `divisions / 12`, sent on the runtime channel.
#[derive(Default)]
pub struct BendCodec;

impl BendCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for BendCodec {
    fn kind(&self) -> &'static str {
        "bend"
    }

    fn encode(&mut self, raw: &RawValue, runtime: &RuntimeConfig) -> Vec<MidiMessage> {
        raw.as_scalar()
            .and_then(|angle| normalize(angle, runtime.bend_min, runtime.bend_max))
            .map(|n| vec![MidiMessage::cc(runtime.channel, intensity(n * runtime.bend_scale()))])
            .unwrap_or_default()
    }

    fn follows_channel(&self, _runtime: &RuntimeConfig) -> bool {
        true
    }

    fn reads_bend(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(msgs: &[MidiMessage]) -> u8 {
        assert_eq!(msgs.len(), 1);
        msgs[0].value()
    }

    #[test]
    fn test_linear_basic() {
        let mut codec = LinearCodec::new(11, -90.0, 90.0);
        let runtime = RuntimeConfig::default();

        assert_eq!(value(&codec.encode(&RawValue::Scalar(-90.0), &runtime)), 0);
        assert_eq!(value(&codec.encode(&RawValue::Scalar(0.0), &runtime)), 64);
        assert_eq!(value(&codec.encode(&RawValue::Scalar(90.0), &runtime)), 127);
    }

    #[test]
    fn test_linear_clamped() {
        let mut codec = LinearCodec::new(13, -1.2, 1.4);
        let runtime = RuntimeConfig::default();

        assert_eq!(value(&codec.encode(&RawValue::Scalar(-5.0), &runtime)), 0);
        assert_eq!(value(&codec.encode(&RawValue::Scalar(5.0), &runtime)), 127);
    }

    #[test]
    fn test_linear_empty_range_sends_nothing() {
        let mut codec = LinearCodec::new(1, 2.0, 2.0);
        assert!(codec.encode(&RawValue::Scalar(2.0), &RuntimeConfig::default()).is_empty());
    }

    #[test]
    fn test_bend_half_way() {
        // (17.5 - -35) / (70 - -35) * 12/12 = 0.5
        let mut codec = BendCodec::new();
        let runtime = RuntimeConfig::default();

        let msgs = codec.encode(&RawValue::Scalar(17.5), &runtime);
        assert_eq!(msgs, vec![MidiMessage::cc(12, 64)]);
    }

    #[test]
    fn test_bend_reads_runtime_every_call() {
        let mut codec = BendCodec::new();
        let mut runtime = RuntimeConfig::default();

        runtime.channel = 20;
        runtime.divisions = 6;
        let msgs = codec.encode(&RawValue::Scalar(70.0), &runtime);
        assert_eq!(msgs, vec![MidiMessage::cc(20, 64)]);

        // 70 is now twice the span, which saturates even at half scale
        runtime.bend_max = 17.5;
        let msgs = codec.encode(&RawValue::Scalar(70.0), &runtime);
        assert_eq!(msgs, vec![MidiMessage::cc(20, 127)]);
        assert!(codec.follows_channel(&runtime));
        assert!(codec.reads_bend());
    }

    #[test]
    fn test_bend_below_min_is_zero() {
        let mut codec = BendCodec::new();
        let msgs = codec.encode(&RawValue::Scalar(-80.0), &RuntimeConfig::default());
        assert_eq!(value(&msgs), 0);
    }

    #[test]
    fn test_bend_inverted_bounds() {
        let mut codec = BendCodec::new();
        let runtime = RuntimeConfig {
            bend_min: 40.0,
            bend_max: -20.0,
            ..RuntimeConfig::default()
        };
        assert_eq!(value(&codec.encode(&RawValue::Scalar(40.0), &runtime)), 0);
        assert_eq!(value(&codec.encode(&RawValue::Scalar(-20.0), &runtime)), 127);
    }
}
