//! Monitor engine: stream IO and effect execution.
mod api;
mod connector;
mod engine;
mod session;
mod settings;
mod sse;
mod types;

pub use api::{ApiError, ScrapeApi, Source, StartRequest};
pub use connector::{ReqwestStreamConnector, StreamConnector, TransportSink};
pub use engine::EngineHandle;
pub use session::StreamSession;
pub use settings::{StreamSettings, DEFAULT_API_URL};
pub use sse::{SseDecoder, SseFrame, DEFAULT_EVENT};
pub use types::{EngineError, EngineEvent, Generation, StreamError, TaskId, TransportEvent};
