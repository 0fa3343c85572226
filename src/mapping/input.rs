//! Raw value extraction
//!
//! An [`InputRef`] names the part of a device snapshot a control reads, e.g.
//! `button.down`, `orientation.gamma` or `left_stick`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::RawValue;
use crate::engine::RuntimeConfig;
use crate::error::InputRefError;
use crate::sources::{Axis, Button, DeviceSnapshot, Stick};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickAxis {
    Horizontal,
    Vertical,
}

/// Where in a snapshot a control reads its raw value from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InputRef {
    Button(Button),
    /// Orientation axis; `None` follows the runtime-configured axis
    Orientation(Option<Axis>),
    /// Both axes of a stick as one composite value
    Stick(StickSide),
    StickAxis(StickSide, StickAxis),
}

impl InputRef {
    /// Whether the snapshot carries what this input needs
    pub fn is_available(&self, snapshot: &DeviceSnapshot) -> bool {
        match self {
            InputRef::Button(_) => true,
            InputRef::Orientation(_) => snapshot.orientation.is_some(),
            InputRef::Stick(side) | InputRef::StickAxis(side, _) => stick(snapshot, *side).is_some(),
        }
    }

    /// Extract the raw value, or `None` when the snapshot lacks the field
    pub fn extract(&self, snapshot: &DeviceSnapshot, runtime: &RuntimeConfig) -> Option<RawValue> {
        match *self {
            InputRef::Button(button) => Some(RawValue::Switch(snapshot.buttons.get(button))),
            InputRef::Orientation(axis) => {
                let axis = axis.unwrap_or(runtime.axis);
                snapshot
                    .orientation
                    .map(|o| RawValue::Scalar(o.axis(axis)))
            }
            InputRef::Stick(side) => stick(snapshot, side).map(|s| RawValue::Vector2 {
                h: s.horizontal,
                v: s.vertical,
            }),
            InputRef::StickAxis(side, axis) => stick(snapshot, side).map(|s| {
                RawValue::Scalar(match axis {
                    StickAxis::Horizontal => s.horizontal,
                    StickAxis::Vertical => s.vertical,
                })
            }),
        }
    }

    /// Whether this input samples the orientation axis calibration listens to
    pub fn reads_axis(&self, configured: Axis) -> bool {
        match self {
            InputRef::Orientation(None) => true,
            InputRef::Orientation(Some(axis)) => *axis == configured,
            _ => false,
        }
    }

    /// Zero value of this input's shape
    pub fn zero(&self) -> RawValue {
        match self {
            InputRef::Button(_) => RawValue::Switch(false),
            InputRef::Orientation(_) | InputRef::StickAxis(..) => RawValue::Scalar(0.0),
            InputRef::Stick(_) => RawValue::Vector2 { h: 0.0, v: 0.0 },
        }
    }
}

fn stick(snapshot: &DeviceSnapshot, side: StickSide) -> Option<Stick> {
    match side {
        StickSide::Left => snapshot.left_stick,
        StickSide::Right => snapshot.right_stick,
    }
}

impl FromStr for InputRef {
    type Err = InputRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s.is_empty() {
            return Err(InputRefError::Empty);
        }
        let (source, field) = match s.split_once('.') {
            Some((source, field)) => (source, Some(field)),
            None => (s.as_str(), None),
        };

        match (source, field) {
            ("button", Some(name)) => name
                .parse()
                .map(InputRef::Button)
                .map_err(InputRefError::InvalidField),
            ("button", None) => Err(InputRefError::InvalidField(
                "button input needs a button name".to_string(),
            )),
            ("orientation", None) => Ok(InputRef::Orientation(None)),
            ("orientation", Some(axis)) => axis
                .parse()
                .map(|a| InputRef::Orientation(Some(a)))
                .map_err(InputRefError::InvalidField),
            ("left_stick", field) => stick_ref(StickSide::Left, field),
            ("right_stick", field) => stick_ref(StickSide::Right, field),
            (other, _) => Err(InputRefError::UnknownSource(other.to_string())),
        }
    }
}

fn stick_ref(side: StickSide, field: Option<&str>) -> Result<InputRef, InputRefError> {
    match field {
        None => Ok(InputRef::Stick(side)),
        Some("horizontal") => Ok(InputRef::StickAxis(side, StickAxis::Horizontal)),
        Some("vertical") => Ok(InputRef::StickAxis(side, StickAxis::Vertical)),
        Some(other) => Err(InputRefError::InvalidField(format!(
            "unknown stick axis '{}'",
            other
        ))),
    }
}

impl fmt::Display for InputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side_name = |side: &StickSide| match side {
            StickSide::Left => "left_stick",
            StickSide::Right => "right_stick",
        };
        match self {
            InputRef::Button(button) => write!(f, "button.{}", button),
            InputRef::Orientation(None) => f.write_str("orientation"),
            InputRef::Orientation(Some(axis)) => write!(f, "orientation.{}", axis),
            InputRef::Stick(side) => f.write_str(side_name(side)),
            InputRef::StickAxis(side, StickAxis::Horizontal) => {
                write!(f, "{}.horizontal", side_name(side))
            }
            InputRef::StickAxis(side, StickAxis::Vertical) => {
                write!(f, "{}.vertical", side_name(side))
            }
        }
    }
}

impl TryFrom<String> for InputRef {
    type Error = InputRefError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<InputRef> for String {
    fn from(input: InputRef) -> Self {
        input.to_string()
    }
}
