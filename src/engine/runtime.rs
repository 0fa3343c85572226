//! Runtime configuration
//!
//! Session-wide parameters read by the codecs on every cycle. Values only
//! change through [`ConfigEvent`]s, which carry the user's text and are
//! validated, clamped, or reset to a safe default by the setters below.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::sources::Axis;

/// Default controller number the bend control is sent on
pub const DEFAULT_CHANNEL: u8 = 12;
/// Default lower bend bound in degrees
pub const DEFAULT_BEND_MIN: f64 = -35.0;
/// Default upper bend bound in degrees
pub const DEFAULT_BEND_MAX: f64 = 70.0;
/// Divisions and joystick increment are expressed in twelfths
pub const FULL_SCALE: u8 = 12;
/// Normalized joystick magnitude below which output is forced to zero
pub const DEFAULT_DEAD_ZONE: f64 = 0.10;

const BEND_LIMIT: f64 = 180.0;

/// How a composite joystick value is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JoystickMode {
    /// One message per axis
    #[default]
    TwoAxis,
    /// One message carrying the distance from center
    AbsoluteOffset,
}

impl FromStr for JoystickMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "two-axis" => Ok(JoystickMode::TwoAxis),
            "absolute-offset" => Ok(JoystickMode::AbsoluteOffset),
            other => Err(format!("unknown joystick mode '{}'", other)),
        }
    }
}

impl fmt::Display for JoystickMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoystickMode::TwoAxis => f.write_str("two-axis"),
            JoystickMode::AbsoluteOffset => f.write_str("absolute-offset"),
        }
    }
}

/// Session-wide mutable parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Controller number for channel-following controls (0-127)
    pub channel: u8,

    /// Angle mapped to zero intensity
    pub bend_min: f64,

    /// Angle mapped to full intensity
    pub bend_max: f64,

    /// Output scale in twelfths (1-12)
    pub divisions: u8,

    /// Orientation axis read by the bend control and by calibration
    pub axis: Axis,

    /// Joystick encoding
    pub joystick_mode: JoystickMode,

    /// Joystick output scale in twelfths (1-12)
    pub joystick_increment: u8,

    /// Joystick dead zone, independent of any control threshold
    pub dead_zone: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL,
            bend_min: DEFAULT_BEND_MIN,
            bend_max: DEFAULT_BEND_MAX,
            divisions: FULL_SCALE,
            axis: Axis::Beta,
            joystick_mode: JoystickMode::TwoAxis,
            joystick_increment: FULL_SCALE,
            dead_zone: DEFAULT_DEAD_ZONE,
        }
    }
}

/// Which runtime field a configuration event targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Axis,
    Channel,
    BendMin,
    BendMax,
    Divisions,
    JoystickMode,
    JoystickIncrement,
    DeadZone,
}

impl FromStr for ConfigKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "axis" | "gyro-axis" => ConfigKey::Axis,
            "channel" | "midi-channel" => ConfigKey::Channel,
            "min" | "bend-min" | "min-angle" => ConfigKey::BendMin,
            "max" | "bend-max" | "max-angle" => ConfigKey::BendMax,
            "divisions" => ConfigKey::Divisions,
            "joystick-mode" | "mode" => ConfigKey::JoystickMode,
            "increment" | "joystick-increment" => ConfigKey::JoystickIncrement,
            "dead-zone" | "deadzone" => ConfigKey::DeadZone,
            other => return Err(format!("unknown setting '{}'", other)),
        };
        Ok(key)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigKey::Axis => "axis",
            ConfigKey::Channel => "channel",
            ConfigKey::BendMin => "bend-min",
            ConfigKey::BendMax => "bend-max",
            ConfigKey::Divisions => "divisions",
            ConfigKey::JoystickMode => "joystick-mode",
            ConfigKey::JoystickIncrement => "joystick-increment",
            ConfigKey::DeadZone => "dead-zone",
        };
        f.write_str(name)
    }
}

/// A user-driven configuration change, still in its raw text form
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigEvent {
    pub key: ConfigKey,
    pub value: String,
}

impl ConfigEvent {
    pub fn new(key: ConfigKey, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

/// Result of applying a setter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Setting<T> {
    /// Value now in effect
    pub value: T,
    /// True when the input was clamped or replaced by the default
    pub corrected: bool,
}

/// Outcome of applying a [`ConfigEvent`]
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigChange {
    pub key: ConfigKey,
    /// Applied value, formatted for display
    pub value: String,
    pub corrected: bool,
}

impl RuntimeConfig {
    /// Apply a configuration event through the matching setter
    pub fn apply(&mut self, event: &ConfigEvent) -> ConfigChange {
        let input = event.value.as_str();
        let (value, corrected) = match event.key {
            ConfigKey::Axis => describe(self.set_axis(input)),
            ConfigKey::Channel => describe(self.set_channel(input)),
            ConfigKey::BendMin => describe(self.set_bend_min(input)),
            ConfigKey::BendMax => describe(self.set_bend_max(input)),
            ConfigKey::Divisions => describe(self.set_divisions(input)),
            ConfigKey::JoystickMode => describe(self.set_joystick_mode(input)),
            ConfigKey::JoystickIncrement => describe(self.set_joystick_increment(input)),
            ConfigKey::DeadZone => describe(self.set_dead_zone(input)),
        };
        ConfigChange {
            key: event.key,
            value,
            corrected,
        }
    }

    pub fn set_axis(&mut self, input: &str) -> Setting<Axis> {
        let setting = match input.parse() {
            Ok(axis) => Setting { value: axis, corrected: false },
            Err(_) => Setting { value: Axis::Beta, corrected: true },
        };
        self.axis = setting.value;
        setting
    }

    /// Callers that emit MIDI must reset the previous channel themselves;
    /// see `Engine::apply_config`.
    pub fn set_channel(&mut self, input: &str) -> Setting<u8> {
        let setting = parse_int(input, 0, 127, DEFAULT_CHANNEL);
        self.channel = setting.value;
        setting
    }

    pub fn set_bend_min(&mut self, input: &str) -> Setting<f64> {
        let setting = parse_float(input, -BEND_LIMIT, BEND_LIMIT, DEFAULT_BEND_MIN);
        self.bend_min = setting.value;
        setting
    }

    pub fn set_bend_max(&mut self, input: &str) -> Setting<f64> {
        let setting = parse_float(input, -BEND_LIMIT, BEND_LIMIT, DEFAULT_BEND_MAX);
        self.bend_max = setting.value;
        setting
    }

    pub fn set_divisions(&mut self, input: &str) -> Setting<u8> {
        let setting = parse_int(input, 1, FULL_SCALE, FULL_SCALE);
        self.divisions = setting.value;
        setting
    }

    pub fn set_joystick_mode(&mut self, input: &str) -> Setting<JoystickMode> {
        let setting = match input.parse() {
            Ok(mode) => Setting { value: mode, corrected: false },
            Err(_) => Setting {
                value: JoystickMode::TwoAxis,
                corrected: true,
            },
        };
        self.joystick_mode = setting.value;
        setting
    }

    pub fn set_joystick_increment(&mut self, input: &str) -> Setting<u8> {
        let setting = parse_int(input, 1, FULL_SCALE, FULL_SCALE);
        self.joystick_increment = setting.value;
        setting
    }

    pub fn set_dead_zone(&mut self, input: &str) -> Setting<f64> {
        let setting = parse_float(input, 0.0, 1.0, DEFAULT_DEAD_ZONE);
        self.dead_zone = setting.value;
        setting
    }

    /// Bend output scale, `divisions / 12`
    pub fn bend_scale(&self) -> f64 {
        self.divisions as f64 / FULL_SCALE as f64
    }

    /// Joystick output scale, `increment / 12`
    pub fn joystick_scale(&self) -> f64 {
        self.joystick_increment as f64 / FULL_SCALE as f64
    }

    /// Bring values loaded from a file into their legal ranges.
    ///
    /// Returns the names of the fields that had to change.
    pub fn sanitize(&mut self) -> Vec<ConfigKey> {
        let mut changed = Vec::new();
        if self.channel > 127 {
            self.channel = 127;
            changed.push(ConfigKey::Channel);
        }
        if !self.bend_min.is_finite() || self.bend_min.abs() > BEND_LIMIT {
            self.bend_min = clamp_or(self.bend_min, -BEND_LIMIT, BEND_LIMIT, DEFAULT_BEND_MIN);
            changed.push(ConfigKey::BendMin);
        }
        if !self.bend_max.is_finite() || self.bend_max.abs() > BEND_LIMIT {
            self.bend_max = clamp_or(self.bend_max, -BEND_LIMIT, BEND_LIMIT, DEFAULT_BEND_MAX);
            changed.push(ConfigKey::BendMax);
        }
        if !(1..=FULL_SCALE).contains(&self.divisions) {
            self.divisions = self.divisions.clamp(1, FULL_SCALE);
            changed.push(ConfigKey::Divisions);
        }
        if !(1..=FULL_SCALE).contains(&self.joystick_increment) {
            self.joystick_increment = self.joystick_increment.clamp(1, FULL_SCALE);
            changed.push(ConfigKey::JoystickIncrement);
        }
        if !(0.0..=1.0).contains(&self.dead_zone) {
            self.dead_zone = clamp_or(self.dead_zone, 0.0, 1.0, DEFAULT_DEAD_ZONE);
            changed.push(ConfigKey::DeadZone);
        }
        changed
    }
}

fn describe<T: fmt::Display>(setting: Setting<T>) -> (String, bool) {
    (setting.value.to_string(), setting.corrected)
}

fn clamp_or(value: f64, min: f64, max: f64, default: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        default
    }
}

/// Parse an integer field. Fractional input is truncated; anything that
/// is not a number falls back to `default`.
fn parse_int(input: &str, min: u8, max: u8, default: u8) -> Setting<u8> {
    let trimmed = input.trim();
    let parsed = trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| {
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| v.trunc() as i64)
        });

    match parsed {
        Some(n) => {
            let clamped = n.clamp(min as i64, max as i64);
            Setting {
                value: clamped as u8,
                corrected: clamped != n || trimmed.parse::<i64>().is_err(),
            }
        }
        None => Setting {
            value: default,
            corrected: true,
        },
    }
}

fn parse_float(input: &str, min: f64, max: f64, default: f64) -> Setting<f64> {
    match input.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => {
            let clamped = v.clamp(min, max);
            Setting {
                value: clamped,
                corrected: clamped != v,
            }
        }
        _ => Setting {
            value: default,
            corrected: true,
        },
    }
}
