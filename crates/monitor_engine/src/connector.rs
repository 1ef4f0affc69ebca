use std::future::Future;
use std::sync::mpsc;
use std::time::Duration;

use futures_util::StreamExt;
use monitor_logging::{monitor_debug, monitor_info};
use reqwest::header::{ACCEPT, CACHE_CONTROL};

use crate::sse::SseDecoder;
use crate::{EngineEvent, Generation, StreamError, StreamSettings, TaskId, TransportEvent};

pub trait TransportSink: Send + Sync {
    fn emit(&self, event: TransportEvent);
}

/// Tags every event with the generation of the connection it belongs to.
pub(crate) struct ChannelTransportSink {
    generation: Generation,
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelTransportSink {
    pub(crate) fn new(generation: Generation, tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { generation, tx }
    }
}

impl TransportSink for ChannelTransportSink {
    fn emit(&self, event: TransportEvent) {
        let _ = self.tx.send(EngineEvent {
            generation: self.generation,
            event,
        });
    }
}

/// Drives one server-push connection for a task.
///
/// Implementations report everything through `sink` and return once the
/// stream is over. A connection that is no longer wanted is cancelled by
/// dropping the returned future.
#[async_trait::async_trait]
pub trait StreamConnector: Send + Sync {
    async fn connect(&self, task_id: &TaskId, sink: &dyn TransportSink);
}

#[derive(Debug, Clone)]
pub struct ReqwestStreamConnector {
    settings: StreamSettings,
}

impl ReqwestStreamConnector {
    pub fn new(settings: StreamSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, StreamError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .build()
            .map_err(|err| StreamError::Network(err.to_string()))
    }

    async fn run(&self, task_id: &TaskId, sink: &dyn TransportSink) -> Result<(), StreamError> {
        let url = self
            .settings
            .endpoint(&["api", "scrape", "stream", task_id.as_str()])?;
        let client = self.build_client()?;
        let idle = self.settings.idle_timeout;

        monitor_debug!("Connecting to {}", url);
        let response = within(
            idle,
            client
                .get(url)
                .header(ACCEPT, "text/event-stream")
                .header(CACHE_CONTROL, "no-cache")
                .send(),
        )
        .await?
        .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::HttpStatus(status.as_u16()));
        }
        sink.emit(TransportEvent::Opened);

        let mut decoder = SseDecoder::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = within(idle, stream.next()).await? {
            let chunk = chunk.map_err(map_reqwest_error)?;
            for frame in decoder.push(&chunk) {
                sink.emit(TransportEvent::Message {
                    event: frame.event,
                    data: frame.data,
                });
            }
        }
        if decoder.finish() {
            monitor_debug!("Discarding unterminated frame for task {}", task_id);
        }

        monitor_info!("Stream for task {} ended by server", task_id);
        sink.emit(TransportEvent::Closed);
        Ok(())
    }
}

#[async_trait::async_trait]
impl StreamConnector for ReqwestStreamConnector {
    async fn connect(&self, task_id: &TaskId, sink: &dyn TransportSink) {
        if let Err(err) = self.run(task_id, sink).await {
            sink.emit(TransportEvent::Failed(err));
        }
    }
}

async fn within<F: Future>(limit: Option<Duration>, future: F) -> Result<F::Output, StreamError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| StreamError::IdleTimeout(limit)),
        None => Ok(future.await),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> StreamError {
    if err.is_timeout() {
        return StreamError::Timeout(err.to_string());
    }
    StreamError::Network(err.to_string())
}
