//! Device snapshot definitions
//!
//! One snapshot is a complete reading of the controller at a point in time.
//! Fields a device cannot report are `None`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Analog stick position (roughly -1.0..1.0 per axis, uncalibrated)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stick {
    pub horizontal: f64,
    pub vertical: f64,
}

impl Stick {
    pub fn new(horizontal: f64, vertical: f64) -> Self {
        Self { horizontal, vertical }
    }
}

/// Orientation estimate in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    /// Yaw
    pub alpha: f64,
    /// Pitch
    pub beta: f64,
    /// Roll
    pub gamma: f64,
}

impl Orientation {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self { alpha, beta, gamma }
    }

    /// Read a single named axis
    pub fn axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Alpha => self.alpha,
            Axis::Beta => self.beta,
            Axis::Gamma => self.gamma,
        }
    }
}

/// Orientation axis selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Alpha,
    #[default]
    Beta,
    Gamma,
}

impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alpha" => Ok(Axis::Alpha),
            "beta" => Ok(Axis::Beta),
            "gamma" => Ok(Axis::Gamma),
            other => Err(format!("unknown axis '{}'", other)),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::Alpha => "alpha",
            Axis::Beta => "beta",
            Axis::Gamma => "gamma",
        };
        f.write_str(name)
    }
}

/// Raw three-axis sensor vector (accelerometer in G, gyroscope in rad/s)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Button states
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Buttons {
    // Left controller
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub l: bool,
    pub zl: bool,
    pub minus: bool,
    pub capture: bool,
    pub left_stick: bool,

    // Right controller
    pub a: bool,
    pub b: bool,
    pub x: bool,
    pub y: bool,
    pub r: bool,
    pub zr: bool,
    pub plus: bool,
    pub home: bool,
    pub right_stick: bool,

    // Rail buttons
    pub sl: bool,
    pub sr: bool,
}

/// Button identifier, used by control inputs to select one button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    L,
    Zl,
    Minus,
    Capture,
    LeftStick,
    A,
    B,
    X,
    Y,
    R,
    Zr,
    Plus,
    Home,
    RightStick,
    Sl,
    Sr,
}

impl Buttons {
    /// Read a single button
    pub fn get(&self, button: Button) -> bool {
        match button {
            Button::Up => self.up,
            Button::Down => self.down,
            Button::Left => self.left,
            Button::Right => self.right,
            Button::L => self.l,
            Button::Zl => self.zl,
            Button::Minus => self.minus,
            Button::Capture => self.capture,
            Button::LeftStick => self.left_stick,
            Button::A => self.a,
            Button::B => self.b,
            Button::X => self.x,
            Button::Y => self.y,
            Button::R => self.r,
            Button::Zr => self.zr,
            Button::Plus => self.plus,
            Button::Home => self.home,
            Button::RightStick => self.right_stick,
            Button::Sl => self.sl,
            Button::Sr => self.sr,
        }
    }

    /// Mutable access to a single button
    pub fn get_mut(&mut self, button: Button) -> &mut bool {
        match button {
            Button::Up => &mut self.up,
            Button::Down => &mut self.down,
            Button::Left => &mut self.left,
            Button::Right => &mut self.right,
            Button::L => &mut self.l,
            Button::Zl => &mut self.zl,
            Button::Minus => &mut self.minus,
            Button::Capture => &mut self.capture,
            Button::LeftStick => &mut self.left_stick,
            Button::A => &mut self.a,
            Button::B => &mut self.b,
            Button::X => &mut self.x,
            Button::Y => &mut self.y,
            Button::R => &mut self.r,
            Button::Zr => &mut self.zr,
            Button::Plus => &mut self.plus,
            Button::Home => &mut self.home,
            Button::RightStick => &mut self.right_stick,
            Button::Sl => &mut self.sl,
            Button::Sr => &mut self.sr,
        }
    }
}

impl FromStr for Button {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let button = match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "up" => Button::Up,
            "down" => Button::Down,
            "left" => Button::Left,
            "right" => Button::Right,
            "l" => Button::L,
            "zl" => Button::Zl,
            "minus" => Button::Minus,
            "capture" => Button::Capture,
            "left_stick" => Button::LeftStick,
            "a" => Button::A,
            "b" => Button::B,
            "x" => Button::X,
            "y" => Button::Y,
            "r" => Button::R,
            "zr" => Button::Zr,
            "plus" => Button::Plus,
            "home" => Button::Home,
            "right_stick" => Button::RightStick,
            "sl" => Button::Sl,
            "sr" => Button::Sr,
            other => return Err(format!("unknown button '{}'", other)),
        };
        Ok(button)
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Button::Up => "up",
            Button::Down => "down",
            Button::Left => "left",
            Button::Right => "right",
            Button::L => "l",
            Button::Zl => "zl",
            Button::Minus => "minus",
            Button::Capture => "capture",
            Button::LeftStick => "left_stick",
            Button::A => "a",
            Button::B => "b",
            Button::X => "x",
            Button::Y => "y",
            Button::R => "r",
            Button::Zr => "zr",
            Button::Plus => "plus",
            Button::Home => "home",
            Button::RightStick => "right_stick",
            Button::Sl => "sl",
            Button::Sr => "sr",
        };
        f.write_str(name)
    }
}

/// One complete reading from the input device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    #[serde(default)]
    pub buttons: Buttons,

    #[serde(default)]
    pub left_stick: Option<Stick>,

    #[serde(default)]
    pub right_stick: Option<Stick>,

    /// Fused orientation; a snapshot without it is not usable
    #[serde(default)]
    pub orientation: Option<Orientation>,

    #[serde(default)]
    pub accelerometer: Option<Vector3>,

    #[serde(default)]
    pub gyroscope: Option<Vector3>,
}

impl DeviceSnapshot {
    /// Snapshot with only an orientation reading
    pub fn with_orientation(orientation: Orientation) -> Self {
        Self {
            orientation: Some(orientation),
            ..Self::default()
        }
    }

    /// Set the left stick (builder pattern)
    pub fn left_stick(mut self, stick: Stick) -> Self {
        self.left_stick = Some(stick);
        self
    }

    /// Set a button state (builder pattern)
    pub fn button(mut self, button: Button, pressed: bool) -> Self {
        *self.buttons.get_mut(button) = pressed;
        self
    }
}
