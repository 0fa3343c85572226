//! Toggle codec
//!
//! A momentary press flips a persistent state. Only rising edges produce
//! output; releases send nothing.

use super::{Codec, RawValue};
use crate::engine::{MidiMessage, RuntimeConfig, VELOCITY_MAX, VELOCITY_MIN};

/// Boolean latch flipped on each rising edge of its input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToggleLatch {
    previous: bool,
    state: bool,
}

impl ToggleLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one input sample. Returns the new state on a rising edge.
    pub fn feed(&mut self, input: bool) -> Option<bool> {
        let rising = input && !self.previous;
        self.previous = input;
        if rising {
            self.state = !self.state;
            Some(self.state)
        } else {
            None
        }
    }

    pub fn state(&self) -> bool {
        self.state
    }
}

pub struct ToggleCodec {
    controller: u8,
    latch: ToggleLatch,
}

impl ToggleCodec {
    pub fn new(controller: u8) -> Self {
        Self {
            controller,
            latch: ToggleLatch::new(),
        }
    }

    pub fn state(&self) -> bool {
        self.latch.state()
    }
}

impl Codec for ToggleCodec {
    fn kind(&self) -> &'static str {
        "toggle"
    }

    fn encode(&mut self, raw: &RawValue, _runtime: &RuntimeConfig) -> Vec<MidiMessage> {
        let Some(pressed) = raw.as_bool() else {
            return Vec::new();
        };
        match self.latch.feed(pressed) {
            Some(true) => vec![MidiMessage::cc(self.controller, VELOCITY_MAX)],
            Some(false) => vec![MidiMessage::cc(self.controller, VELOCITY_MIN)],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_flips_on_rising_edge_only() {
        let mut latch = ToggleLatch::new();

        assert_eq!(latch.feed(false), None);
        assert_eq!(latch.feed(true), Some(true));
        assert_eq!(latch.feed(true), None);
        assert_eq!(latch.feed(false), None);
        assert_eq!(latch.feed(true), Some(false));
        assert!(!latch.state());
    }

    #[test]
    fn test_release_sends_nothing() {
        let mut codec = ToggleCodec::new(5);
        let runtime = RuntimeConfig::default();

        let press = codec.encode(&RawValue::Switch(true), &runtime);
        assert_eq!(press, vec![MidiMessage::cc(5, 127)]);
        assert!(codec.encode(&RawValue::Switch(false), &runtime).is_empty());

        let press = codec.encode(&RawValue::Switch(true), &runtime);
        assert_eq!(press, vec![MidiMessage::cc(5, 0)]);
        assert!(!codec.state());
    }
}
