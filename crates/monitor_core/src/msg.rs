#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Caller adopted a task identifier, or cleared it with `None`.
    Bind(Option<crate::TaskId>),
    /// Caller released the session; the connection must close.
    Dispose,
    /// Transport reported the stream as open.
    TransportOpened { generation: crate::Generation },
    /// A named server-sent event with its raw text payload.
    StreamEvent {
        generation: crate::Generation,
        event: String,
        data: String,
    },
    /// Transport failed or the server closed the stream.
    TransportLost {
        generation: crate::Generation,
        reason: String,
    },
}
