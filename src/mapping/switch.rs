//! Edge-to-state codec
//!
//! The output mirrors the button: pressed sends "on", released sends "off".

use super::{Codec, RawValue};
use crate::engine::{MidiMessage, RuntimeConfig, VELOCITY_MAX, VELOCITY_MIN};

/// What a button drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Note on / note off
    Note(u8),
    /// Controller at full / zero
    Controller(u8),
}

pub struct SwitchCodec {
    target: Target,
}

impl SwitchCodec {
    pub fn new(target: Target) -> Self {
        Self { target }
    }

    pub fn note(note: u8) -> Self {
        Self::new(Target::Note(note))
    }

    pub fn controller(controller: u8) -> Self {
        Self::new(Target::Controller(controller))
    }
}

impl Codec for SwitchCodec {
    fn kind(&self) -> &'static str {
        match self.target {
            Target::Note(_) => "note",
            Target::Controller(_) => "button_cc",
        }
    }

    fn encode(&mut self, raw: &RawValue, _runtime: &RuntimeConfig) -> Vec<MidiMessage> {
        let Some(pressed) = raw.as_bool() else {
            return Vec::new();
        };
        let msg = match (self.target, pressed) {
            (Target::Note(note), true) => MidiMessage::note_on(note),
            (Target::Note(note), false) => MidiMessage::note_off(note),
            (Target::Controller(ctrl), true) => MidiMessage::cc(ctrl, VELOCITY_MAX),
            (Target::Controller(ctrl), false) => MidiMessage::cc(ctrl, VELOCITY_MIN),
        };
        vec![msg]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_follows_button() {
        let mut codec = SwitchCodec::note(0x24);
        let runtime = RuntimeConfig::default();

        assert_eq!(
            codec.encode(&RawValue::Switch(true), &runtime),
            vec![MidiMessage::note_on(0x24)]
        );
        assert_eq!(
            codec.encode(&RawValue::Switch(false), &runtime),
            vec![MidiMessage::note_off(0x24)]
        );
    }

    #[test]
    fn test_controller_follows_button() {
        let mut codec = SwitchCodec::controller(3);
        let runtime = RuntimeConfig::default();

        let on = codec.encode(&RawValue::Switch(true), &runtime);
        assert_eq!(on[0].to_bytes(), [0xB0, 3, 127]);
        let off = codec.encode(&RawValue::Switch(false), &runtime);
        assert_eq!(off[0].to_bytes(), [0xB0, 3, 0]);
    }

    #[test]
    fn test_vector_input_is_ignored() {
        let mut codec = SwitchCodec::note(1);
        let out = codec.encode(&RawValue::Vector2 { h: 1.0, v: 1.0 }, &RuntimeConfig::default());
        assert!(out.is_empty());
    }
}
