//! Device sources for tiltmidi
//!
//! Sources attach to an input device and emit [`DeviceSnapshot`]s for the
//! engine to translate.

mod replay;
mod snapshot;
mod source;
mod sweep;

pub use replay::{load_recording, parse_recording, ReplayConfig, ReplaySource};
pub use snapshot::{Axis, Button, Buttons, DeviceSnapshot, Orientation, Stick, Vector3};
pub use source::{Source, SNAPSHOT_BUFFER};
pub use sweep::{sweep_snapshot, SweepConfig, SweepSource};
