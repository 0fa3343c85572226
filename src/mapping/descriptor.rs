//! Control descriptors
//!
//! A descriptor is one named mapping rule: where to read the raw value, how
//! to encode it, and the change-detection state that gates the encoding.

use super::{ChangeDetector, Codec, InputRef, RawValue};
use crate::engine::{MidiMessage, RuntimeConfig};

/// Outcome of evaluating one control against one raw value
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Change too small; codec not invoked, anchor unchanged
    Suppressed,
    /// Codec invoked; may still be empty (e.g. a toggle release)
    Fired(Vec<MidiMessage>),
}

pub struct ControlDescriptor {
    name: String,
    input: InputRef,
    codec: Box<dyn Codec>,
    change: ChangeDetector,
}

impl ControlDescriptor {
    /// Create a descriptor with threshold 0 and a zero initial value
    pub fn new<C: Codec + 'static>(name: impl Into<String>, input: InputRef, codec: C) -> Self {
        Self::boxed(name, input, Box::new(codec))
    }

    pub fn boxed(name: impl Into<String>, input: InputRef, codec: Box<dyn Codec>) -> Self {
        Self {
            name: name.into(),
            change: ChangeDetector::new(input.zero(), 0.0),
            input,
            codec,
        }
    }

    /// Set the suppression threshold (builder pattern)
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.change = ChangeDetector::new(self.change.last(), threshold.max(0.0));
        self
    }

    /// Set the value the first sample is compared against
    pub fn with_initial(mut self, initial: RawValue) -> Self {
        self.change = ChangeDetector::new(initial, self.change.threshold());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input(&self) -> &InputRef {
        &self.input
    }

    pub fn kind(&self) -> &'static str {
        self.codec.kind()
    }

    pub fn threshold(&self) -> f64 {
        self.change.threshold()
    }

    /// Last raw value that passed change detection
    pub fn last_value(&self) -> RawValue {
        self.change.last()
    }

    pub fn follows_channel(&self, runtime: &RuntimeConfig) -> bool {
        self.codec.follows_channel(runtime)
    }

    pub fn reads_bend(&self) -> bool {
        self.codec.reads_bend()
    }

    /// Make the next evaluation fire regardless of distance
    pub fn invalidate(&mut self) {
        self.change.invalidate();
    }

    /// Run change detection and, if the value moved enough, the codec.
    ///
    /// A fired value becomes the new anchor even when the codec produced
    /// no message.
    pub fn evaluate(&mut self, raw: RawValue, runtime: &RuntimeConfig) -> Evaluation {
        if !self.change.exceeds(&raw, runtime.joystick_mode) {
            return Evaluation::Suppressed;
        }
        let msgs = self.codec.encode(&raw, runtime);
        self.change.record(raw);
        Evaluation::Fired(msgs)
    }
}

impl std::fmt::Debug for ControlDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlDescriptor")
            .field("name", &self.name)
            .field("input", &self.input)
            .field("codec", &self.codec.kind())
            .field("change", &self.change)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{LinearCodec, ToggleCodec};
    use crate::sources::Button;

    #[test]
    fn test_same_value_twice_fires_once() {
        let mut control = ControlDescriptor::new(
            "beta",
            "orientation.beta".parse().unwrap(),
            LinearCodec::new(11, -90.0, 90.0),
        );
        let runtime = RuntimeConfig::default();

        assert_eq!(
            control.evaluate(RawValue::Scalar(45.0), &runtime),
            Evaluation::Fired(vec![MidiMessage::cc(11, 95)])
        );
        assert_eq!(control.evaluate(RawValue::Scalar(45.0), &runtime), Evaluation::Suppressed);
    }

    #[test]
    fn test_suppressed_keeps_anchor() {
        let mut control = ControlDescriptor::new(
            "beta",
            "orientation.beta".parse().unwrap(),
            LinearCodec::new(11, -90.0, 90.0),
        )
        .with_threshold(3.0);
        let runtime = RuntimeConfig::default();

        assert_eq!(control.evaluate(RawValue::Scalar(2.0), &runtime), Evaluation::Suppressed);
        assert_eq!(control.evaluate(RawValue::Scalar(2.9), &runtime), Evaluation::Suppressed);
        assert_eq!(control.last_value(), RawValue::Scalar(0.0));
        assert!(matches!(
            control.evaluate(RawValue::Scalar(3.5), &runtime),
            Evaluation::Fired(_)
        ));
        assert_eq!(control.last_value(), RawValue::Scalar(3.5));
    }

    #[test]
    fn test_empty_codec_output_still_records() {
        let mut control =
            ControlDescriptor::new("toggle", InputRef::Button(Button::Sl), ToggleCodec::new(5));
        let runtime = RuntimeConfig::default();

        control.evaluate(RawValue::Switch(true), &runtime);
        assert_eq!(
            control.evaluate(RawValue::Switch(false), &runtime),
            Evaluation::Fired(vec![])
        );
        assert_eq!(control.last_value(), RawValue::Switch(false));
    }

    #[test]
    fn test_initial_value() {
        let mut control = ControlDescriptor::new(
            "gamma",
            "orientation.gamma".parse().unwrap(),
            LinearCodec::new(12, -90.0, 90.0),
        )
        .with_threshold(1.0)
        .with_initial(RawValue::Scalar(30.0));
        let runtime = RuntimeConfig::default();

        assert_eq!(control.threshold(), 1.0);
        assert_eq!(control.evaluate(RawValue::Scalar(30.5), &runtime), Evaluation::Suppressed);
    }
}
