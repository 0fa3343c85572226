//! MIDI output for tiltmidi.
//!
//! Encodes outgoing events as three-byte messages and sends them to a MIDI
//! port through midir.

use std::fmt;
use std::sync::mpsc::{self, Sender};
use std::thread;

use anyhow::{anyhow, Result};
use midir::MidiOutput;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::sink::OutputSink;
use crate::error::SinkError;

/// All messages go out on the first MIDI channel (status nibble 0)
pub const OUTPUT_CHANNEL: u8 = 0;
/// Full note velocity / controller value
pub const VELOCITY_MAX: u8 = 0x7F;
/// Zero note velocity / controller value
pub const VELOCITY_MIN: u8 = 0;

/// MIDI message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note on: channel (0-15), note (0-127), velocity (0-127)
    NoteOn(u8, u8, u8),
    /// Note off: channel (0-15), note (0-127), velocity (0-127)
    NoteOff(u8, u8, u8),
    /// Control change: channel (0-15), controller (0-127), value (0-127)
    ControlChange(u8, u8, u8),
}

impl MidiMessage {
    /// Note on for `note` at full velocity on the output channel
    pub fn note_on(note: u8) -> Self {
        MidiMessage::NoteOn(OUTPUT_CHANNEL, note, VELOCITY_MAX)
    }

    /// Note off for `note`. Release velocity is full, matching what the
    /// receivers this was tuned against expect.
    pub fn note_off(note: u8) -> Self {
        MidiMessage::NoteOff(OUTPUT_CHANNEL, note, VELOCITY_MAX)
    }

    /// Control change on the output channel
    pub fn cc(controller: u8, value: u8) -> Self {
        MidiMessage::ControlChange(OUTPUT_CHANNEL, controller, value)
    }

    /// Convert to raw MIDI bytes.
    pub fn to_bytes(&self) -> [u8; 3] {
        match *self {
            MidiMessage::NoteOn(ch, note, vel) => [0x90 | (ch & 0x0F), note & 0x7F, vel & 0x7F],
            MidiMessage::NoteOff(ch, note, vel) => [0x80 | (ch & 0x0F), note & 0x7F, vel & 0x7F],
            MidiMessage::ControlChange(ch, ctrl, val) => {
                [0xB0 | (ch & 0x0F), ctrl & 0x7F, val & 0x7F]
            }
        }
    }

    /// Controller number for CC messages
    pub fn controller(&self) -> Option<u8> {
        match *self {
            MidiMessage::ControlChange(_, ctrl, _) => Some(ctrl),
            _ => None,
        }
    }

    /// Velocity or controller value
    pub fn value(&self) -> u8 {
        match *self {
            MidiMessage::NoteOn(_, _, v)
            | MidiMessage::NoteOff(_, _, v)
            | MidiMessage::ControlChange(_, _, v) => v,
        }
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [status, data1, data2] = self.to_bytes();
        write!(f, "{:02X} {:02X} {:02X}", status, data1, data2)
    }
}

/// Configuration for MIDI output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiConfig {
    /// Substring of the port name to connect to (None = first port)
    pub port: Option<String>,
    /// Client name announced to the MIDI system
    pub client_name: String,
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            port: None,
            client_name: "tiltmidi".to_string(),
        }
    }
}

/// MIDI output player.
pub struct MidiPlayer {
    sender: Sender<MidiPlayerCommand>,
    port_name: String,
}

enum MidiPlayerCommand {
    Send([u8; 3]),
    Stop,
}

impl MidiPlayer {
    /// Create a new MIDI player connected to the configured port.
    pub fn new(config: &MidiConfig) -> Result<Self> {
        let midi_out = MidiOutput::new(&config.client_name)?;
        let ports = midi_out.ports();

        if ports.is_empty() {
            return Err(anyhow!("No MIDI output ports available"));
        }

        let port = if let Some(name) = config.port.as_deref() {
            ports
                .iter()
                .find(|p| {
                    midi_out
                        .port_name(p)
                        .map(|n| n.contains(name))
                        .unwrap_or(false)
                })
                .ok_or_else(|| anyhow!("MIDI port '{}' not found", name))?
                .clone()
        } else {
            ports[0].clone()
        };

        let port_name = midi_out.port_name(&port)?;
        let conn = midi_out
            .connect(&port, "tiltmidi-output")
            .map_err(|e| anyhow!("Failed to connect to '{}': {}", port_name, e))?;

        let (sender, receiver) = mpsc::channel::<MidiPlayerCommand>();

        // Spawn thread to handle MIDI messages
        thread::spawn(move || {
            let mut conn = conn;
            while let Ok(cmd) = receiver.recv() {
                match cmd {
                    MidiPlayerCommand::Send(bytes) => {
                        if let Err(e) = conn.send(&bytes) {
                            warn!("MIDI send failed: {}", e);
                        }
                    }
                    MidiPlayerCommand::Stop => break,
                }
            }
            conn.close();
            debug!("MIDI output thread finished");
        });

        info!("MIDI output connected to: {}", port_name);

        Ok(Self { sender, port_name })
    }

    /// Name of the connected port
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Stop the MIDI player.
    pub fn stop(&self) {
        let _ = self.sender.send(MidiPlayerCommand::Stop);
    }
}

impl OutputSink for MidiPlayer {
    fn name(&self) -> &str {
        &self.port_name
    }

    fn send(&mut self, msg: MidiMessage) -> Result<(), SinkError> {
        self.sender
            .send(MidiPlayerCommand::Send(msg.to_bytes()))
            .map_err(|_| SinkError::Closed(self.port_name.clone()))
    }
}

impl Drop for MidiPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// List available MIDI output ports.
pub fn list_midi_ports() -> Result<Vec<String>> {
    let midi_out = MidiOutput::new("tiltmidi list")?;
    let ports = midi_out.ports();

    let names: Vec<String> = ports
        .iter()
        .filter_map(|p| midi_out.port_name(p).ok())
        .collect();

    Ok(names)
}
