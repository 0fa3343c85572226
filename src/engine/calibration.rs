//! Bend bound calibration
//!
//! Arming a session makes the next sample of the configured orientation axis
//! become the chosen bend bound. The session disarms itself as part of the
//! capture, so each arming captures exactly once.

use std::fmt;
use std::str::FromStr;

use super::runtime::RuntimeConfig;

/// Which bend bound a calibration writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Min,
    Max,
}

impl FromStr for Bound {
    type Err = String;

    /// Accepts `min`/`max` and longer ids such as `min-angle`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s.contains("min") {
            Ok(Bound::Min)
        } else if s.contains("max") {
            Ok(Bound::Max)
        } else {
            Err(s)
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Min => f.write_str("min"),
            Bound::Max => f.write_str("max"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalibrationState {
    #[default]
    Idle,
    Armed(Bound),
}

/// A completed capture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capture {
    pub bound: Bound,
    pub value: f64,
}

#[derive(Debug, Default)]
pub struct CalibrationSession {
    state: CalibrationState,
}

impl CalibrationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm for `bound`. Re-arming replaces the previous target.
    pub fn arm(&mut self, bound: Bound) -> CalibrationState {
        std::mem::replace(&mut self.state, CalibrationState::Armed(bound))
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, CalibrationState::Armed(_))
    }

    /// Consume `value` if armed: write it into the target bound and go idle.
    pub fn capture(&mut self, value: f64, runtime: &mut RuntimeConfig) -> Option<Capture> {
        let CalibrationState::Armed(bound) = std::mem::take(&mut self.state) else {
            return None;
        };
        match bound {
            Bound::Min => runtime.bend_min = value,
            Bound::Max => runtime.bend_max = value,
        }
        Some(Capture { bound, value })
    }
}
