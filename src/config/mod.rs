//! Configuration loading and validation

mod schema;

pub use schema::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Default configuration file name
pub const DEFAULT_CONFIG: &str = "tiltmidi.yaml";

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<TiltConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {:?}", path))?;
    parse_config(&contents).with_context(|| format!("invalid config {:?}", path))
}

/// Parse and validate configuration text.
///
/// Runtime values outside their legal ranges are corrected, not rejected;
/// the corrected fields are listed in `corrections`.
pub fn parse_config(contents: &str) -> Result<TiltConfig> {
    let mut config: TiltConfig = serde_yaml::from_str(contents)?;
    config.validate()?;
    config.corrections = config.runtime.sanitize();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ConfigKey, JoystickMode, MidiMessage, RuntimeConfig};
    use crate::mapping::presets::Preset;
    use crate::mapping::{Evaluation, InputRef, RawValue};
    use crate::sources::{Axis, Button, DeviceSnapshot};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_minimal_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"preset: stick\n").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.preset, Preset::Stick);
        assert_eq!(config.runtime, RuntimeConfig::default());
        assert_eq!(config.device.kind, DeviceKind::Sweep);
        assert_eq!(config.device.interval_ms, 10);
        assert_eq!(config.midi.client_name, "tiltmidi");
        assert_eq!(config.build_controls().len(), 1);
    }

    #[test]
    fn test_example_config_is_valid() {
        let config = parse_config(include_str!("../../tiltmidi.example.yaml")).unwrap();
        assert!(config.controls.is_empty());
        assert_eq!(config.build_controls()[0].name(), "tilt");
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
log_level: debug
midi:
  port: IAC
device:
  kind: replay
  path: session.jsonl
  looping: true
runtime:
  channel: 20
  axis: gamma
  joystick_mode: absolute-offset
controls:
  - name: a-note
    input: button.a
    codec: { kind: note, note: 60 }
  - name: click
    input: button.left_stick
    codec: { kind: toggle, controller: 5 }
  - name: pitch
    input: orientation.beta
    codec: { kind: linear, controller: 11, min: -90, max: 90 }
    threshold: 3
    initial: 0
  - name: tilt
    input: orientation
    codec: { kind: bend }
    threshold: 0.5
  - name: stick
    input: left_stick
    codec: { kind: joystick, horizontal: 13, vertical: 14, min: -1.2, max: 1.4 }
    initial: [0, 0]
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.midi.port.as_deref(), Some("IAC"));
        assert_eq!(config.device.kind, DeviceKind::Replay);
        assert!(config.device.looping);
        assert_eq!(config.runtime.channel, 20);
        assert_eq!(config.runtime.axis, Axis::Gamma);
        assert_eq!(config.runtime.joystick_mode, JoystickMode::AbsoluteOffset);
        assert_eq!(config.runtime.bend_min, -35.0);

        assert_eq!(config.controls[0].input, InputRef::Button(Button::A));
        assert_eq!(config.controls[2].codec, CodecConfig::Linear { controller: 11, min: -90.0, max: 90.0 });
        assert_eq!(config.controls[4].initial, Some(InitialValue::Vector([0.0, 0.0])));

        let controls = config.build_controls();
        assert_eq!(controls.len(), 5);
        assert_eq!(controls[2].threshold(), 3.0);
        assert_eq!(controls[2].last_value(), RawValue::Scalar(0.0));
        assert!(controls[3].follows_channel(&config.runtime));
        assert!(!controls[0].follows_channel(&config.runtime));
        // absolute-offset mode sends the stick on the runtime channel
        assert!(controls[4].follows_channel(&config.runtime));
        assert_eq!(controls[4].kind(), "joystick");
    }

    #[test]
    fn test_built_controls_drive_engine() {
        let yaml = r#"
controls:
  - name: a-note
    input: button.a
    codec: { kind: note, note: 60 }
"#;
        let config = parse_config(yaml).unwrap();
        let mut control = config.build_controls().remove(0);
        let snapshot = DeviceSnapshot::default().button(Button::A, true);
        let raw = control.input().extract(&snapshot, &config.runtime).unwrap();

        match control.evaluate(raw, &config.runtime) {
            Evaluation::Fired(msgs) => {
                assert_eq!(msgs, vec![MidiMessage::note_on(60)])
            }
            other => panic!("expected note on, got {:?}", other),
        }
    }

    #[test]
    fn test_runtime_out_of_range_is_corrected() {
        let config = parse_config("runtime:\n  divisions: 40\n  dead_zone: 3\n").unwrap();
        assert_eq!(config.runtime.divisions, 12);
        assert_eq!(config.runtime.dead_zone, 1.0);
        assert_eq!(config.corrections, vec![ConfigKey::Divisions, ConfigKey::DeadZone]);
    }

    #[test]
    fn test_in_range_runtime_has_no_corrections() {
        let config = parse_config("runtime:\n  divisions: 6\n").unwrap();
        assert!(config.corrections.is_empty());
    }

    #[test]
    fn test_invalid_configs() {
        let cases = [
            // duplicate names
            "controls:\n  - {name: x, input: button.a, codec: {kind: bend}}\n  - {name: x, input: button.b, codec: {kind: bend}}\n",
            // MIDI number out of range
            "controls:\n  - {name: x, input: button.a, codec: {kind: note, note: 200}}\n",
            // empty linear range
            "controls:\n  - {name: x, input: orientation.beta, codec: {kind: linear, controller: 1, min: 5, max: 5}}\n",
            // zero joystick deviation
            "controls:\n  - {name: x, input: left_stick, codec: {kind: joystick, horizontal: 1, vertical: 2, min: 0, max: 0}}\n",
            // negative threshold
            "controls:\n  - {name: x, input: button.a, codec: {kind: note, note: 1}, threshold: -1}\n",
            // initial value of the wrong shape
            "controls:\n  - {name: x, input: button.a, codec: {kind: note, note: 1}, initial: [0, 0]}\n",
            // unknown input
            "controls:\n  - {name: x, input: pedal, codec: {kind: note, note: 1}}\n",
            // replay without a recording
            "device:\n  kind: replay\n",
            "device:\n  interval_ms: 0\n",
            "log_level: loud\n",
        ];
        for yaml in cases {
            assert!(parse_config(yaml).is_err(), "accepted: {}", yaml);
        }
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/tiltmidi.yaml")).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to read config"));
    }
}
