//! Replay source
//!
//! Plays back snapshots recorded as JSON lines, one [`DeviceSnapshot`] per
//! line, at a fixed interval.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::source::SNAPSHOT_BUFFER;
use super::{DeviceSnapshot, Source};

/// Configuration for replay source
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// JSON-lines snapshot file
    pub path: PathBuf,
    /// Time between snapshots
    pub interval: Duration,
    /// Start over when the file is exhausted
    pub looping: bool,
}

/// Parse a JSON-lines snapshot recording. Blank lines are skipped.
pub fn parse_recording(contents: &str) -> Result<Vec<DeviceSnapshot>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("invalid snapshot on line {}", i + 1))
        })
        .collect()
}

/// Read a recording from disk
pub fn load_recording(path: &Path) -> Result<Vec<DeviceSnapshot>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read recording {:?}", path))?;
    let snapshots = parse_recording(&contents)?;
    if snapshots.is_empty() {
        bail!("recording {:?} contains no snapshots", path);
    }
    Ok(snapshots)
}

/// Source that replays a recorded session
pub struct ReplaySource {
    name: String,
    config: ReplayConfig,
    running: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    sender: broadcast::Sender<DeviceSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl ReplaySource {
    /// Create a new replay source
    pub fn new(name: impl Into<String>, config: ReplayConfig) -> Self {
        let (sender, _) = broadcast::channel(SNAPSHOT_BUFFER);
        Self {
            name: name.into(),
            config,
            running: Arc::new(AtomicBool::new(false)),
            finished: Arc::new(AtomicBool::new(false)),
            sender,
            task: None,
        }
    }
}

impl Source for ReplaySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) -> Result<()> {
        if self.is_running() || self.is_finished() {
            return Ok(());
        }

        let snapshots = load_recording(&self.config.path)?;
        info!(
            "{}: replaying {} snapshots from {:?}",
            self.name,
            snapshots.len(),
            self.config.path
        );

        self.running.store(true, Ordering::SeqCst);

        let name = self.name.clone();
        let interval = self.config.interval;
        let looping = self.config.looping;
        let running = Arc::clone(&self.running);
        let finished = Arc::clone(&self.finished);
        let sender = self.sender.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);

            'replay: loop {
                for snapshot in &snapshots {
                    if !running.load(Ordering::SeqCst) {
                        break 'replay;
                    }
                    ticker.tick().await;
                    let _ = sender.send(snapshot.clone());
                }
                if !looping {
                    debug!("{}: recording exhausted", name);
                    finished.store(true, Ordering::SeqCst);
                    break;
                }
            }
            running.store(false, Ordering::SeqCst);
        });

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

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<DeviceSnapshot> {
        self.sender.subscribe()
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const RECORDING: &str = r#"{"orientation": {"alpha": 0, "beta": -35, "gamma": 0}}
{"orientation": {"alpha": 0, "beta": 17.5, "gamma": 0}}

{"buttons": {"down": true}}
"#;

    fn recording_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_recording() {
        let snapshots = parse_recording(RECORDING).unwrap();
        assert_eq!(snapshots.len(), 3);
        assert_eq!(snapshots[1].orientation.unwrap().beta, 17.5);
        assert!(snapshots[2].orientation.is_none());
    }

    #[test]
    fn test_parse_error_names_line() {
        let err = parse_recording("{}\nnot json\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_empty_recording_rejected() {
        let file = recording_file("\n\n");
        assert!(load_recording(file.path()).is_err());
    }

    #[tokio::test]
    async fn test_replay_emits_all_then_finishes() {
        let file = recording_file(RECORDING);
        let mut source = ReplaySource::new(
            "replay",
            ReplayConfig {
                path: file.path().to_path_buf(),
                interval: Duration::from_millis(1),
                looping: false,
            },
        );
        let mut receiver = source.subscribe();

        source.start().unwrap();

        let mut received = Vec::new();
        for _ in 0..3 {
            let snapshot = tokio::time::timeout(Duration::from_secs(2), receiver.recv())
                .await
                .expect("timeout")
                .expect("receive error");
            received.push(snapshot);
        }
        assert_eq!(received, parse_recording(RECORDING).unwrap());

        tokio::time::timeout(Duration::from_secs(2), async {
            while !source.is_finished() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("replay never finished");
        assert!(!source.is_running());
    }

    #[tokio::test]
    async fn test_missing_file_fails_to_start() {
        let mut source = ReplaySource::new(
            "replay",
            ReplayConfig {
                path: PathBuf::from("/nonexistent/recording.jsonl"),
                interval: Duration::from_millis(1),
                looping: false,
            },
        );
        assert!(source.start().is_err());
        assert!(!source.is_running());
    }
}
