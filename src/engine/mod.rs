//! Translation engine for tiltmidi
//!
//! Runs the update cycle: once per device snapshot every control is
//! evaluated in registration order and the resulting messages are sent to
//! the output.

mod calibration;
mod midi;
mod observer;
mod runtime;
mod sink;

pub use calibration::{Bound, CalibrationSession, CalibrationState, Capture};
pub use midi::{list_midi_ports, MidiConfig, MidiMessage, MidiPlayer, OUTPUT_CHANNEL, VELOCITY_MAX, VELOCITY_MIN};
pub use observer::{LogObserver, Observer};
pub use runtime::{ConfigChange, ConfigEvent, ConfigKey, JoystickMode, RuntimeConfig, Setting};
pub use sink::{LogSink, MemorySink, Output, OutputSink};

use tracing::{debug, trace};

use crate::mapping::{ControlDescriptor, Evaluation};
use crate::sources::DeviceSnapshot;

/// Running totals since the engine was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Cycles that evaluated controls
    pub cycles: u64,
    /// Cycles skipped for an incomplete snapshot
    pub skipped: u64,
    pub sent: u64,
    pub dropped: u64,
    /// Control evaluations held back by change detection
    pub suppressed: u64,
}

/// What one call to [`Engine::process`] did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub skipped: bool,
    pub sent: usize,
    pub dropped: usize,
    pub capture: Option<Capture>,
}

/// The main translation engine
pub struct Engine {
    runtime: RuntimeConfig,
    calibration: CalibrationSession,
    controls: Vec<ControlDescriptor>,
    output: Output,
    observer: Box<dyn Observer>,
    stats: EngineStats,
}

impl Engine {
    /// Create an engine with no output connected
    pub fn new(runtime: RuntimeConfig, controls: Vec<ControlDescriptor>) -> Self {
        Self {
            runtime,
            calibration: CalibrationSession::new(),
            controls,
            output: Output::disconnected(),
            observer: Box::new(LogObserver),
            stats: EngineStats::default(),
        }
    }

    /// Set the output sink (builder pattern)
    pub fn with_output(mut self, sink: Box<dyn OutputSink>) -> Self {
        self.output = Output::connected(sink);
        self
    }

    /// Set the observer (builder pattern)
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Attach an output sink at runtime
    pub fn connect(&mut self, sink: Box<dyn OutputSink>) {
        self.output.connect(sink);
    }

    pub fn is_connected(&self) -> bool {
        self.output.is_connected()
    }

    pub fn runtime(&self) -> &RuntimeConfig {
        &self.runtime
    }

    pub fn controls(&self) -> &[ControlDescriptor] {
        &self.controls
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn calibration(&self) -> CalibrationState {
        self.calibration.state()
    }

    /// Capture the next sample of the configured axis into `bound`
    pub fn arm_calibration(&mut self, bound: Bound) {
        if let CalibrationState::Armed(previous) = self.calibration.arm(bound) {
            debug!("Calibration target changed from {} to {}", previous, bound);
        }
        debug!("Calibrating bend {} on axis {}", bound, self.runtime.axis);
    }

    /// Apply a configuration event.
    ///
    /// Moving to a new channel first zeroes the old one, and the controls
    /// sending on the channel re-send on their next sample. A changed bend
    /// range re-sends the bend controls. Events that leave the effective
    /// output unchanged re-send nothing.
    pub fn apply_config(&mut self, event: &ConfigEvent) -> ConfigChange {
        let previous = self.runtime.clone();
        let change = self.runtime.apply(event);

        if self.runtime.channel != previous.channel {
            self.send(MidiMessage::cc(previous.channel, 0), "channel-reset");
            let runtime = &self.runtime;
            for control in self.controls.iter_mut().filter(|c| c.follows_channel(runtime)) {
                control.invalidate();
            }
        }
        if bend_changed(&previous, &self.runtime) {
            self.invalidate_bend(self.controls.len());
        }

        self.observer.on_config(&change);
        change
    }

    /// Run one update cycle for `snapshot`.
    ///
    /// A snapshot missing any field a control needs (or the orientation)
    /// skips the cycle for every control.
    pub fn process(&mut self, snapshot: &DeviceSnapshot) -> CycleReport {
        let mut report = CycleReport::default();

        let complete = snapshot.orientation.is_some()
            && self.controls.iter().all(|c| c.input().is_available(snapshot));
        if !complete {
            self.stats.skipped += 1;
            report.skipped = true;
            trace!("incomplete snapshot, cycle skipped");
            return report;
        }
        self.stats.cycles += 1;

        // Index of a capture that moved a bend bound
        let mut captured_at = None;
        for index in 0..self.controls.len() {
            let control = &mut self.controls[index];
            let Some(raw) = control.input().extract(snapshot, &self.runtime) else {
                continue;
            };

            if self.calibration.is_armed() && control.input().reads_axis(self.runtime.axis) {
                let previous = (self.runtime.bend_min, self.runtime.bend_max);
                if let Some(capture) = raw
                    .as_scalar()
                    .and_then(|value| self.calibration.capture(value, &mut self.runtime))
                {
                    self.observer.on_capture(&capture);
                    report.capture = Some(capture);
                    if previous != (self.runtime.bend_min, self.runtime.bend_max) {
                        captured_at = Some(index);
                    }
                }
            }
            if captured_at.is_some() && control.reads_bend() {
                control.invalidate();
            }

            match control.evaluate(raw, &self.runtime) {
                Evaluation::Suppressed => self.stats.suppressed += 1,
                Evaluation::Fired(msgs) => {
                    let name = control.name().to_string();
                    for msg in msgs {
                        if self.send(msg, &name) {
                            report.sent += 1;
                        } else {
                            report.dropped += 1;
                        }
                    }
                }
            }
        }

        // Bend controls evaluated before the capture pick up the new bounds next cycle
        if let Some(index) = captured_at {
            self.invalidate_bend(index);
        }

        report
    }

    /// Force the bend controls among the first `count` to re-send
    fn invalidate_bend(&mut self, count: usize) {
        for control in self.controls[..count].iter_mut().filter(|c| c.reads_bend()) {
            control.invalidate();
        }
    }

    fn send(&mut self, msg: MidiMessage, control: &str) -> bool {
        match self.output.deliver(msg, control) {
            Ok(()) => {
                self.stats.sent += 1;
                true
            }
            Err(_) => {
                self.stats.dropped += 1;
                false
            }
        }
    }
}

fn bend_changed(a: &RuntimeConfig, b: &RuntimeConfig) -> bool {
    a.bend_min != b.bend_min || a.bend_max != b.bend_max || a.divisions != b.divisions || a.axis != b.axis
}
