//! Source trait

use tokio::sync::broadcast;

use super::DeviceSnapshot;

/// Capacity of each source's snapshot channel
pub const SNAPSHOT_BUFFER: usize = 64;

/// Trait for device snapshot sources
pub trait Source: Send {
    /// Get the name of this source
    fn name(&self) -> &str;

    /// Attach to the device and start emitting snapshots.
    ///
    /// Calling this on a running source is a no-op.
    fn start(&mut self) -> anyhow::Result<()>;

    /// Stop emitting snapshots
    fn stop(&mut self);

    /// Check if the source is running
    fn is_running(&self) -> bool;

    /// True once a finite source has emitted everything it will
    fn is_finished(&self) -> bool {
        false
    }

    /// Subscribe to snapshots from this source
    fn subscribe(&self) -> broadcast::Receiver<DeviceSnapshot>;
}
