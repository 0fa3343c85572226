//! Observer for user-facing engine notifications

use tracing::{info, warn};

use super::calibration::Capture;
use super::runtime::ConfigChange;

/// Receives results the user should see: calibration captures and the
/// values configuration events actually settled on.
pub trait Observer: Send {
    fn on_capture(&mut self, capture: &Capture);

    fn on_config(&mut self, change: &ConfigChange);
}

/// Observer that reports through the log
#[derive(Debug, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_capture(&mut self, capture: &Capture) {
        info!("Calibrated bend {} to {:.2}", capture.bound, capture.value);
    }

    fn on_config(&mut self, change: &ConfigChange) {
        if change.corrected {
            warn!("{} input was out of range, using {}", change.key, change.value);
        } else {
            info!("{} set to {}", change.key, change.value);
        }
    }
}
