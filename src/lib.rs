//! tiltmidi - Motion controller to MIDI translation
//!
//! Turns readings from a handheld motion controller (buttons, analog stick,
//! fused orientation) into MIDI note and control-change messages. Tilt
//! becomes a bend on a selectable controller, buttons become notes, and the
//! stick becomes a pair of controllers.

pub mod config;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod session;
pub mod sources;

pub use config::TiltConfig;
pub use engine::Engine;
pub use session::Session;
