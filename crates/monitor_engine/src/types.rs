use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;

pub use monitor_core::{Generation, TaskId};

/// What a single connection reports back, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Message { event: String, data: String },
    /// The server ended the stream cleanly.
    Closed,
    Failed(StreamError),
}

/// A transport event tagged with the connection that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEvent {
    pub generation: Generation,
    pub event: TransportEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("invalid stream url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("stream endpoint answered {0}")]
    HttpStatus(u16),
    #[error("no data received for {0:?}")]
    IdleTimeout(Duration),
    #[error("connect timeout: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start stream runtime: {0}")]
    Runtime(#[from] io::Error),
}

impl fmt::Display for TransportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportEvent::Opened => write!(f, "opened"),
            TransportEvent::Message { event, data } => {
                write!(f, "event '{event}' ({} bytes)", data.len())
            }
            TransportEvent::Closed => write!(f, "closed"),
            TransportEvent::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}
