//! Output sinks
//!
//! The engine hands every outgoing message to an [`Output`], which forwards it
//! to the connected [`OutputSink`] or drops it when nothing is connected.
//! Delivery is fire-and-forget: failed messages are never queued or retried.

use std::sync::{Arc, Mutex};

use tracing::{info, trace, warn};

use super::midi::MidiMessage;
use crate::error::SinkError;

/// Destination for outgoing MIDI messages
pub trait OutputSink: Send {
    /// Get the name of this sink
    fn name(&self) -> &str;

    /// Deliver one message without blocking
    fn send(&mut self, msg: MidiMessage) -> Result<(), SinkError>;
}

/// Sink that records messages in memory
///
/// Clones share the same buffer, so a test can keep one handle and give
/// the other to the engine.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    messages: Arc<Mutex<Vec<MidiMessage>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything sent so far
    pub fn messages(&self) -> Vec<MidiMessage> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Remove and return everything sent so far
    pub fn take(&self) -> Vec<MidiMessage> {
        self.messages
            .lock()
            .map(|mut m| std::mem::take(&mut *m))
            .unwrap_or_default()
    }
}

impl OutputSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn send(&mut self, msg: MidiMessage) -> Result<(), SinkError> {
        self.messages
            .lock()
            .map_err(|_| SinkError::Closed("memory".to_string()))?
            .push(msg);
        Ok(())
    }
}

/// Sink that logs messages instead of sending them (dry run)
#[derive(Debug, Default)]
pub struct LogSink;

impl OutputSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    fn send(&mut self, msg: MidiMessage) -> Result<(), SinkError> {
        info!(bytes = %msg, "MIDI");
        Ok(())
    }
}

/// The engine's handle on its (possibly absent) sink
#[derive(Default)]
pub struct Output {
    sink: Option<Box<dyn OutputSink>>,
}

impl Output {
    /// Output with nothing connected
    pub fn disconnected() -> Self {
        Self { sink: None }
    }

    pub fn connected(sink: Box<dyn OutputSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Attach a sink, replacing any previous one
    pub fn connect(&mut self, sink: Box<dyn OutputSink>) {
        info!("Output connected to {}", sink.name());
        self.sink = Some(sink);
    }

    pub fn is_connected(&self) -> bool {
        self.sink.is_some()
    }

    /// Send one message. Failures are logged and the message is dropped.
    pub fn deliver(&mut self, msg: MidiMessage, control: &str) -> Result<(), SinkError> {
        let result = match self.sink.as_mut() {
            Some(sink) => sink.send(msg),
            None => Err(SinkError::NotConnected),
        };
        match &result {
            Ok(()) => trace!(control, bytes = %msg, "sent"),
            Err(e) => warn!(control, bytes = %msg, "dropped: {}", e),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_shares_buffer() {
        let sink = MemorySink::new();
        let mut handle: Box<dyn OutputSink> = Box::new(sink.clone());

        handle.send(MidiMessage::cc(1, 2)).unwrap();
        handle.send(MidiMessage::note_on(36)).unwrap();

        assert_eq!(sink.messages().len(), 2);
        assert_eq!(sink.take(), vec![MidiMessage::cc(1, 2), MidiMessage::note_on(36)]);
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn test_disconnected_output_drops() {
        let mut output = Output::disconnected();
        assert!(!output.is_connected());
        assert_eq!(
            output.deliver(MidiMessage::cc(1, 2), "test"),
            Err(SinkError::NotConnected)
        );
    }

    #[test]
    fn test_connect_later() {
        let sink = MemorySink::new();
        let mut output = Output::disconnected();
        output.connect(Box::new(sink.clone()));

        assert!(output.deliver(MidiMessage::cc(3, 4), "test").is_ok());
        assert_eq!(sink.messages(), vec![MidiMessage::cc(3, 4)]);
    }
}
