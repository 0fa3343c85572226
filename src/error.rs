//! Error types shared across tiltmidi

use thiserror::Error;

/// Failures delivering a message to the output sink.
///
/// Never fatal: the engine drops the message and logs a diagnostic.
#[derive(Debug, Error, PartialEq)]
pub enum SinkError {
    /// No output has been connected yet
    #[error("MIDI output not connected")]
    NotConnected,

    /// The output's delivery thread or port went away
    #[error("MIDI output '{0}' is closed")]
    Closed(String),
}

/// A control input reference that could not be parsed
#[derive(Debug, Error, PartialEq)]
pub enum InputRefError {
    #[error("empty input reference")]
    Empty,

    #[error("unknown input source '{0}'")]
    UnknownSource(String),

    #[error("{0}")]
    InvalidField(String),
}

/// A console command that could not be parsed
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("'{0}' needs a value")]
    MissingValue(String),

    #[error("invalid calibration target '{0}' (expected min or max)")]
    InvalidBound(String),
}
