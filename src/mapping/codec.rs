//! Codec trait

use super::RawValue;
use crate::engine::{MidiMessage, RuntimeConfig};

/// Turns a raw control value into outgoing MIDI messages.
///
/// Codecs read the runtime configuration on every call and never cache it.
/// Stateful codecs (toggles, dead-zone tracking) keep their state inside.
pub trait Codec: Send {
    /// Short kind name for logs
    fn kind(&self) -> &'static str;

    /// Encode a value; an empty result means nothing to send
    fn encode(&mut self, raw: &RawValue, runtime: &RuntimeConfig) -> Vec<MidiMessage>;

    /// True when, under `runtime`, the controller number is the runtime channel
    fn follows_channel(&self, _runtime: &RuntimeConfig) -> bool {
        false
    }

    /// True when the output depends on the bend bounds, divisions or axis
    fn reads_bend(&self) -> bool {
        false
    }
}
