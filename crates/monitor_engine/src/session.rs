use std::sync::Arc;
use std::time::Duration;

use monitor_core::{update, Effect, Msg, SessionModel, SessionState, SessionView};

use crate::connector::{ReqwestStreamConnector, StreamConnector};
use crate::{EngineError, EngineEvent, EngineHandle, StreamSettings, TaskId, TransportEvent};

/// Binds one task identifier at a time to a live event stream.
///
/// All session state lives on the caller's thread and only changes inside
/// [`bind`](Self::bind), [`dispose`](Self::dispose), [`poll`](Self::poll) and
/// [`wait_for_change`](Self::wait_for_change). Connections run on the engine
/// runtime; their events are applied in arrival order, and events from a
/// superseded connection are discarded by generation.
pub struct StreamSession {
    state: SessionModel,
    engine: EngineHandle,
}

impl StreamSession {
    pub fn new(settings: StreamSettings) -> Result<Self, EngineError> {
        Self::with_connector(Arc::new(ReqwestStreamConnector::new(settings)))
    }

    pub fn with_connector(connector: Arc<dyn StreamConnector>) -> Result<Self, EngineError> {
        Ok(Self {
            state: SessionModel::new(),
            engine: EngineHandle::new(connector)?,
        })
    }

    /// Adopts `task_id` (or clears the binding with `None`) and returns the
    /// resulting snapshot. Binding the task whose stream is still open is a no-op.
    pub fn bind(&mut self, task_id: Option<TaskId>) -> SessionView {
        self.dispatch(Msg::Bind(task_id));
        self.view()
    }

    /// Closes the open connection, if any. Safe to call any number of times.
    pub fn dispose(&mut self) {
        self.dispatch(Msg::Dispose);
    }

    pub fn view(&self) -> SessionView {
        self.state.view()
    }

    pub fn state(&self) -> SessionState {
        self.state.session()
    }

    pub fn task_id(&self) -> Option<&TaskId> {
        self.state.task_id()
    }

    /// Applies every transport event delivered so far. Returns whether the view changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Some(event) = self.engine.try_recv() {
            changed |= self.apply(event);
        }
        changed
    }

    /// Blocks up to `timeout` for the next transport event, then drains like [`poll`](Self::poll).
    pub fn wait_for_change(&mut self, timeout: Duration) -> bool {
        match self.engine.recv_timeout(timeout) {
            Some(event) => {
                let changed = self.apply(event);
                self.poll() || changed
            }
            None => false,
        }
    }

    fn apply(&mut self, event: EngineEvent) -> bool {
        self.dispatch(into_msg(event))
    }

    fn dispatch(&mut self, msg: Msg) -> bool {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let changed = state.consume_dirty();
        self.state = state;
        for effect in effects {
            match effect {
                Effect::OpenStream {
                    generation,
                    task_id,
                } => self.engine.open(generation, task_id),
                Effect::CloseStream { generation } => self.engine.close(generation),
            }
        }
        changed
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn into_msg(event: EngineEvent) -> Msg {
    let generation = event.generation;
    match event.event {
        TransportEvent::Opened => Msg::TransportOpened { generation },
        TransportEvent::Message { event, data } => Msg::StreamEvent {
            generation,
            event,
            data,
        },
        TransportEvent::Closed => Msg::TransportLost {
            generation,
            reason: "stream closed by server".to_string(),
        },
        TransportEvent::Failed(err) => Msg::TransportLost {
            generation,
            reason: err.to_string(),
        },
    }
}
