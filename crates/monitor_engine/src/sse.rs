//! Incremental decoder for `text/event-stream` bodies.
//!
//! Chunks may split lines, and even UTF-8 sequences, at arbitrary byte
//! offsets; bytes are buffered until a full line is available.

use monitor_logging::monitor_trace;

/// Event name used when a frame carries no `event:` field.
pub const DEFAULT_EVENT: &str = "message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns every frame completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if let Some(frame) = self.process_line(&String::from_utf8_lossy(&line)) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Ends the stream. A frame without its terminating blank line was never
    /// dispatched and is discarded; returns whether anything was dropped.
    pub fn finish(&mut self) -> bool {
        let pending = !self.buffer.is_empty() || !self.data.is_empty() || self.event.is_some();
        self.buffer.clear();
        self.data.clear();
        self.event = None;
        pending
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            // Comment; the backend uses these as keep-alives.
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" | "retry" => {}
            other => monitor_trace!("Ignoring unknown SSE field '{}'", other),
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        let data = std::mem::take(&mut self.data).join("\n");
        if data.is_empty() {
            return None;
        }
        Some(SseFrame {
            event: event
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            data,
        })
    }
}
