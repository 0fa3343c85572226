//! Session loop
//!
//! Owns the engine and the device source and serializes everything that
//! touches them: snapshots, console commands, the attachment poll and the
//! shutdown signal are all handled on one task.

mod command;

pub use command::{spawn_console, Command};

use std::time::Duration;

use anyhow::Result;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, warn};

use crate::engine::Engine;
use crate::sources::{DeviceSnapshot, Source};

/// Default period of the attachment poll
pub const DEFAULT_ATTACH_INTERVAL: Duration = Duration::from_secs(2);

pub struct Session {
    engine: Engine,
    source: Box<dyn Source>,
    attach_interval: Duration,
}

impl Session {
    pub fn new(engine: Engine, source: Box<dyn Source>) -> Self {
        Self {
            engine,
            source,
            attach_interval: DEFAULT_ATTACH_INTERVAL,
        }
    }

    /// Set the attachment poll period (builder pattern)
    pub fn with_attach_interval(mut self, interval: Duration) -> Self {
        self.attach_interval = interval;
        self
    }

    /// Run until quit, shutdown, or a finite source runs dry.
    ///
    /// Returns the engine so callers can inspect its final state.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<Engine> {
        let mut snapshots = self.source.subscribe();
        let mut attach = tokio::time::interval(self.attach_interval);
        let mut commands_open = true;
        let mut shutdown_open = true;

        info!("Session started on {}", self.source.name());

        loop {
            tokio::select! {
                biased;

                changed = shutdown.changed(), if shutdown_open => match changed {
                    Ok(()) if *shutdown.borrow() => {
                        info!("Shutting down");
                        break;
                    }
                    Ok(()) => {}
                    Err(_) => shutdown_open = false,
                },

                command = commands.recv(), if commands_open => match command {
                    Some(command) => {
                        if !self.handle(command) {
                            break;
                        }
                    }
                    None => {
                        debug!("Command channel closed");
                        commands_open = false;
                    }
                },

                _ = attach.tick() => {
                    if self.source.is_finished() {
                        self.drain(&mut snapshots);
                        info!("{} finished", self.source.name());
                        break;
                    }
                    self.attach();
                }

                received = snapshots.recv() => match received {
                    Ok(snapshot) => {
                        self.engine.process(&snapshot);
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!("Falling behind the device, skipped {} snapshots", missed);
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        self.source.stop();
        self.log_status();
        Ok(self.engine)
    }

    /// Apply one command. Returns false when the session should end.
    pub fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Config(event) => {
                self.engine.apply_config(&event);
            }
            Command::Calibrate(bound) => self.engine.arm_calibration(bound),
            Command::Status => self.log_status(),
            Command::Quit => return false,
        }
        true
    }

    fn attach(&mut self) {
        if self.source.is_running() {
            return;
        }
        match self.source.start() {
            Ok(()) => info!("Attached to {}", self.source.name()),
            Err(e) => warn!("Could not attach to {}: {:#}", self.source.name(), e),
        }
    }

    fn drain(&mut self, snapshots: &mut broadcast::Receiver<DeviceSnapshot>) {
        loop {
            match snapshots.try_recv() {
                Ok(snapshot) => {
                    self.engine.process(&snapshot);
                }
                Err(TryRecvError::Lagged(missed)) => {
                    warn!("Falling behind the device, skipped {} snapshots", missed);
                }
                Err(_) => break,
            }
        }
    }

    fn log_status(&self) {
        let runtime = self.engine.runtime();
        let stats = self.engine.stats();
        info!(
            "channel {} | axis {} | bend {:.1}..{:.1} /{} | joystick {} x{} | dead zone {:.2}",
            runtime.channel,
            runtime.axis,
            runtime.bend_min,
            runtime.bend_max,
            runtime.divisions,
            runtime.joystick_mode,
            runtime.joystick_increment,
            runtime.dead_zone,
        );
        info!(
            "{} cycles, {} skipped, {} sent, {} dropped, {} suppressed | calibration {:?} | output {}",
            stats.cycles,
            stats.skipped,
            stats.sent,
            stats.dropped,
            stats.suppressed,
            self.engine.calibration(),
            if self.engine.is_connected() { "connected" } else { "disconnected" },
        );
    }
}
