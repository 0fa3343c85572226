//! Built-in control registries

use serde::{Deserialize, Serialize};

use super::{
    BendCodec, ControlDescriptor, InputRef, JoystickCodec, LinearCodec, StickAxis, StickSide,
    SwitchCodec, ToggleCodec,
};
use crate::sources::{Axis, Button};

/// Left stick extremes observed on real hardware
const STICK_H: (f64, f64) = (-1.2, 1.4);
const STICK_V: (f64, f64) = (-0.7, 0.9);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Tilt on the configured axis bends the runtime channel
    #[default]
    Gyro,
    /// Left stick as a composite joystick
    Stick,
    /// Full left-controller layout: buttons, orientation, stick axes
    Buttons,
}

impl Preset {
    pub fn controls(self) -> Vec<ControlDescriptor> {
        match self {
            Preset::Gyro => gyro(),
            Preset::Stick => stick(),
            Preset::Buttons => buttons(),
        }
    }
}

pub fn gyro() -> Vec<ControlDescriptor> {
    vec![ControlDescriptor::new("tilt", InputRef::Orientation(None), BendCodec::new()).with_threshold(0.5)]
}

pub fn stick() -> Vec<ControlDescriptor> {
    vec![ControlDescriptor::new(
        "left-stick",
        InputRef::Stick(StickSide::Left),
        JoystickCodec::new(0x0D, 0x0E, STICK_H.0, STICK_H.1),
    )
    .with_threshold(0.02)]
}

pub fn buttons() -> Vec<ControlDescriptor> {
    // Buttons first: they are latency critical and change rarely
    let notes = [
        ("down-button", Button::Down, 0x24),
        ("right-button", Button::Right, 0x25),
        ("up-button", Button::Up, 0x26),
        ("left-button", Button::Left, 0x27),
        ("l-button", Button::L, 0x28),
        ("zl-button", Button::Zl, 0x29),
        ("capture-button-as-note", Button::Capture, 0x2A),
        ("minus-button-as-note", Button::Minus, 0x2B),
    ];
    let ccs = [
        ("minus-button-as-cc", Button::Minus, 0x01),
        ("capture-button-as-cc", Button::Capture, 0x02),
        ("l-sl-button", Button::Sl, 0x03),
        ("l-sr-button", Button::Sr, 0x04),
    ];

    let mut controls: Vec<ControlDescriptor> = notes
        .into_iter()
        .map(|(name, button, note)| {
            ControlDescriptor::new(name, InputRef::Button(button), SwitchCodec::note(note))
        })
        .collect();

    controls.extend(ccs.into_iter().map(|(name, button, ctrl)| {
        ControlDescriptor::new(name, InputRef::Button(button), SwitchCodec::controller(ctrl))
    }));

    controls.push(ControlDescriptor::new(
        "l-stick-toggle",
        InputRef::Button(Button::LeftStick),
        ToggleCodec::new(0x05),
    ));

    controls.push(
        ControlDescriptor::new(
            "l-orientation.beta",
            InputRef::Orientation(Some(Axis::Beta)),
            LinearCodec::new(0x0B, -90.0, 90.0),
        )
        .with_threshold(3.0),
    );
    controls.push(
        ControlDescriptor::new(
            "l-orientation.gamma",
            InputRef::Orientation(Some(Axis::Gamma)),
            LinearCodec::new(0x0C, -90.0, 90.0),
        )
        .with_threshold(3.0),
    );

    controls.push(
        ControlDescriptor::new(
            "l-analog-horizontal",
            InputRef::StickAxis(StickSide::Left, StickAxis::Horizontal),
            LinearCodec::new(0x0D, STICK_H.0, STICK_H.1),
        )
        .with_threshold(0.02 * (STICK_H.1 - STICK_H.0)),
    );
    controls.push(
        ControlDescriptor::new(
            "l-analog-vertical",
            InputRef::StickAxis(StickSide::Left, StickAxis::Vertical),
            LinearCodec::new(0x0E, STICK_V.0, STICK_V.1),
        )
        .with_threshold(0.02 * (STICK_V.1 - STICK_V.0)),
    );

    controls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RuntimeConfig;
    use std::collections::HashSet;

    #[test]
    fn test_gyro_preset() {
        let controls = Preset::Gyro.controls();
        assert_eq!(controls.len(), 1);
        assert_eq!(controls[0].kind(), "bend");
        assert!(controls[0].follows_channel(&RuntimeConfig::default()));
        assert!(controls[0].reads_bend());
    }

    #[test]
    fn test_buttons_preset_layout() {
        let controls = Preset::Buttons.controls();
        assert_eq!(controls.len(), 17);

        let names: HashSet<&str> = controls.iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), controls.len(), "names must be unique");

        // Buttons come before analog controls
        let first_analog = controls.iter().position(|c| c.kind() == "linear").unwrap();
        assert!(controls[..first_analog]
            .iter()
            .all(|c| matches!(c.input(), InputRef::Button(_))));
    }

    #[test]
    fn test_preset_from_yaml() {
        let preset: Preset = serde_yaml::from_str("stick").unwrap();
        assert_eq!(preset, Preset::Stick);
    }
}
