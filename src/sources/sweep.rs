//! Simulated device
//!
//! Emits a deterministic motion pattern: the controller tilts back and forth
//! across the default bend range, the stick circles, and a few buttons are
//! pressed once per period. Useful for checking a MIDI setup without
//! hardware.

use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

use super::source::SNAPSHOT_BUFFER;
use super::{Buttons, DeviceSnapshot, Orientation, Source, Stick, Vector3};

/// Configuration for the simulated device
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Time between snapshots
    pub interval: Duration,
    /// Length of one full motion cycle
    pub period: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(10),
            period: Duration::from_secs(4),
        }
    }
}

/// Snapshot at `phase` (0.0..1.0) of the motion cycle
pub fn sweep_snapshot(phase: f64) -> DeviceSnapshot {
    let angle = TAU * phase;

    // beta covers -35..70, the default bend range
    let beta = 17.5 + 52.5 * angle.sin();
    let gamma = 30.0 * (2.0 * angle).sin();
    let alpha = 0.0;

    let buttons = Buttons {
        down: phase < 0.1,
        zl: (0.5..0.6).contains(&phase),
        left_stick: (0.25..0.3).contains(&phase),
        ..Buttons::default()
    };

    DeviceSnapshot {
        buttons,
        left_stick: Some(Stick::new(0.8 * angle.cos(), 0.8 * angle.sin())),
        right_stick: None,
        orientation: Some(Orientation::new(alpha, beta, gamma)),
        accelerometer: Some(Vector3 {
            x: beta.to_radians().sin(),
            y: gamma.to_radians().sin(),
            z: beta.to_radians().cos() * gamma.to_radians().cos(),
        }),
        gyroscope: Some(Vector3 {
            x: 52.5f64.to_radians() * TAU * angle.cos(),
            y: 0.0,
            z: 0.0,
        }),
    }
}

/// Source that emits a simulated motion pattern
pub struct SweepSource {
    name: String,
    config: SweepConfig,
    running: Arc<AtomicBool>,
    sender: broadcast::Sender<DeviceSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl SweepSource {
    /// Create a new simulated source
    pub fn new(name: impl Into<String>, config: SweepConfig) -> Self {
        let (sender, _) = broadcast::channel(SNAPSHOT_BUFFER);
        Self {
            name: name.into(),
            config,
            running: Arc::new(AtomicBool::new(false)),
            sender,
            task: None,
        }
    }
}

impl Source for SweepSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) -> anyhow::Result<()> {
        if self.is_running() {
            return Ok(());
        }

        self.running.store(true, Ordering::SeqCst);

        let interval = self.config.interval;
        let steps = (self.config.period.as_secs_f64() / interval.as_secs_f64()).max(1.0) as u64;
        let running = Arc::clone(&self.running);
        let sender = self.sender.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut step = 0u64;

            while running.load(Ordering::SeqCst) {
                ticker.tick().await;
                let phase = (step % steps) as f64 / steps as f64;
                // No receivers is fine; the snapshot is just dropped
                let _ = sender.send(sweep_snapshot(phase));
                step += 1;
            }
        });

        debug!("{}: simulated device attached", self.name);
        self.task = Some(task);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<DeviceSnapshot> {
        self.sender.subscribe()
    }
}

impl Drop for SweepSource {
    fn drop(&mut self) {
        self.stop();
    }
}
