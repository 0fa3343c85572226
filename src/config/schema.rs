//! Configuration schema definitions

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::engine::{ConfigKey, MidiConfig, RuntimeConfig};
use crate::mapping::{
    presets::Preset, BendCodec, Codec, ControlDescriptor, InputRef, JoystickCodec, LinearCodec,
    RawValue, SwitchCodec, ToggleCodec,
};
use crate::sources::{ReplayConfig, ReplaySource, Source, SweepConfig, SweepSource};

/// Main configuration for tiltmidi
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TiltConfig {
    /// Log level when no -v flag is given (default: info)
    #[serde(default)]
    pub log_level: Option<String>,

    /// MIDI output settings
    #[serde(default)]
    pub midi: MidiConfig,

    /// Input device settings
    #[serde(default)]
    pub device: DeviceConfig,

    /// Initial runtime settings
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Built-in registry used when `controls` is empty
    #[serde(default)]
    pub preset: Preset,

    /// Explicit control registry, evaluated in order
    #[serde(default)]
    pub controls: Vec<ControlConfig>,

    /// Runtime fields corrected while loading
    #[serde(skip)]
    pub corrections: Vec<ConfigKey>,
}

impl TiltConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = &self.log_level {
            if level.parse::<tracing::Level>().is_err() {
                bail!("Unknown log level '{}'", level);
            }
        }

        if self.device.interval_ms == 0 {
            bail!("Device interval must be greater than 0");
        }
        if self.device.attach_interval_secs == 0 {
            bail!("Attach interval must be greater than 0");
        }
        if self.device.kind == DeviceKind::Replay && self.device.path.is_none() {
            bail!("Replay device requires a path");
        }

        let mut names = HashSet::new();
        for control in &self.controls {
            if !names.insert(control.name.as_str()) {
                bail!("Duplicate control name '{}'", control.name);
            }
            control.validate()?;
        }

        Ok(())
    }

    /// Build the control registry: the explicit controls, or the preset
    pub fn build_controls(&self) -> Vec<ControlDescriptor> {
        if self.controls.is_empty() {
            return self.preset.controls();
        }
        self.controls.iter().map(ControlConfig::build).collect()
    }

    /// Build the configured device source
    pub fn build_source(&self) -> Box<dyn Source> {
        let interval = Duration::from_millis(self.device.interval_ms);
        match (&self.device.kind, &self.device.path) {
            (DeviceKind::Replay, Some(path)) => Box::new(ReplaySource::new(
                "replay",
                ReplayConfig {
                    path: path.clone(),
                    interval,
                    looping: self.device.looping,
                },
            )),
            _ => Box::new(SweepSource::new(
                "sweep",
                SweepConfig {
                    interval,
                    ..SweepConfig::default()
                },
            )),
        }
    }
}

/// Input device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device type (default: sweep)
    #[serde(default)]
    pub kind: DeviceKind,

    /// Recording to replay (replay only)
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Milliseconds between snapshots (default: 10)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Restart the recording when it runs out (replay only)
    #[serde(default)]
    pub looping: bool,

    /// Seconds between attachment attempts (default: 2)
    #[serde(default = "default_attach_interval_secs")]
    pub attach_interval_secs: u64,
}

fn default_interval_ms() -> u64 { 10 }
fn default_attach_interval_secs() -> u64 { 2 }

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            kind: DeviceKind::default(),
            path: None,
            interval_ms: default_interval_ms(),
            looping: false,
            attach_interval_secs: default_attach_interval_secs(),
        }
    }
}

impl DeviceConfig {
    pub fn attach_interval(&self) -> Duration {
        Duration::from_secs(self.attach_interval_secs)
    }
}

/// Types of input devices
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Simulated motion
    #[default]
    Sweep,
    /// Recorded snapshots
    Replay,
}

/// One control in the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Unique name, used in logs
    pub name: String,

    /// Device field the control reads
    pub input: InputRef,

    /// How the value becomes MIDI
    pub codec: CodecConfig,

    /// Minimum change before re-sending (default: 0)
    #[serde(default)]
    pub threshold: f64,

    /// Value assumed before the first sample
    #[serde(default)]
    pub initial: Option<InitialValue>,
}

impl ControlConfig {
    pub fn validate(&self) -> Result<()> {
        if self.threshold < 0.0 || self.threshold.is_nan() {
            bail!("Control '{}' has a negative threshold", self.name);
        }
        if let Err(e) = self.codec.validate() {
            bail!("Control '{}': {}", self.name, e);
        }
        if let Some(initial) = self.initial {
            if !same_shape(&initial.into(), &self.input.zero()) {
                bail!("Control '{}' initial value does not match its input", self.name);
            }
        }
        Ok(())
    }

    pub fn build(&self) -> ControlDescriptor {
        let descriptor = ControlDescriptor::boxed(self.name.clone(), self.input, self.codec.build())
            .with_threshold(self.threshold);
        match self.initial {
            Some(initial) => descriptor.with_initial(initial.into()),
            None => descriptor,
        }
    }
}

fn same_shape(a: &RawValue, b: &RawValue) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

/// Codec settings, tagged by `kind`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CodecConfig {
    /// Note on while pressed, note off on release
    Note { note: u8 },
    /// CC 127 while pressed, 0 on release
    ButtonCc { controller: u8 },
    /// Each press flips a CC between 127 and 0
    Toggle { controller: u8 },
    /// Scalar scaled from [min, max] onto a CC
    Linear { controller: u8, min: f64, max: f64 },
    /// Scalar over the runtime bend range on the runtime channel
    Bend,
    /// Stick as two CCs or one offset on the runtime channel
    Joystick {
        horizontal: u8,
        vertical: u8,
        min: f64,
        max: f64,
    },
}

impl CodecConfig {
    pub fn validate(&self) -> Result<()> {
        let numbers = match *self {
            CodecConfig::Note { note } => vec![note],
            CodecConfig::ButtonCc { controller }
            | CodecConfig::Toggle { controller }
            | CodecConfig::Linear { controller, .. } => vec![controller],
            CodecConfig::Bend => Vec::new(),
            CodecConfig::Joystick {
                horizontal,
                vertical,
                ..
            } => vec![horizontal, vertical],
        };
        for number in numbers {
            if number > 127 {
                bail!("MIDI number {} is out of range (0-127)", number);
            }
        }

        match self {
            CodecConfig::Linear { min, max, .. } if min == max => {
                bail!("linear range is empty ({} to {})", min, max);
            }
            CodecConfig::Joystick { min, max, .. } if min.abs().max(max.abs()) == 0.0 => {
                bail!("joystick range has zero deviation");
            }
            _ => Ok(()),
        }
    }

    pub fn build(&self) -> Box<dyn Codec> {
        match *self {
            CodecConfig::Note { note } => Box::new(SwitchCodec::note(note)),
            CodecConfig::ButtonCc { controller } => Box::new(SwitchCodec::controller(controller)),
            CodecConfig::Toggle { controller } => Box::new(ToggleCodec::new(controller)),
            CodecConfig::Linear { controller, min, max } => {
                Box::new(LinearCodec::new(controller, min, max))
            }
            CodecConfig::Bend => Box::new(BendCodec::new()),
            CodecConfig::Joystick {
                horizontal,
                vertical,
                min,
                max,
            } => Box::new(JoystickCodec::new(horizontal, vertical, min, max)),
        }
    }
}

/// Starting value for change detection, shaped like the input
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum InitialValue {
    Switch(bool),
    Scalar(f64),
    Vector([f64; 2]),
}

impl From<InitialValue> for RawValue {
    fn from(value: InitialValue) -> Self {
        match value {
            InitialValue::Switch(pressed) => RawValue::Switch(pressed),
            InitialValue::Scalar(value) => RawValue::Scalar(value),
            InitialValue::Vector([h, v]) => RawValue::Vector2 { h, v },
        }
    }
}
