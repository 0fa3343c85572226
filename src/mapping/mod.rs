//! Mapping system for turning controller readings into MIDI
//!
//! Each control reads one raw value from a device snapshot, gates it with
//! change detection, and encodes it through a codec.

mod change;
mod codec;
mod descriptor;
mod input;
mod joystick;
mod linear;
pub mod presets;
mod switch;
mod toggle;
mod value;

pub use change::ChangeDetector;
pub use codec::Codec;
pub use descriptor::{ControlDescriptor, Evaluation};
pub use input::{InputRef, StickAxis, StickSide};
pub use joystick::JoystickCodec;
pub use linear::{normalize, BendCodec, LinearCodec};
pub use presets::Preset;
pub use switch::{SwitchCodec, Target};
pub use toggle::{ToggleCodec, ToggleLatch};
pub use value::{intensity, RawValue};
