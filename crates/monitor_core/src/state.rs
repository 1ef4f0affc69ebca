use std::fmt;

use serde::{Deserialize, Serialize};

use crate::view_model::SessionView;
use crate::{LogEntry, ResultRecord};

/// Epoch tag of one transport connection.
pub type Generation = u64;

/// Opaque identifier of a remote scraping job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Connecting,
    Streaming,
    Completed,
    Errored,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Errored)
    }

    /// True while a job is being watched; the front end blocks new starts.
    pub fn is_running(self) -> bool {
        matches!(self, SessionState::Connecting | SessionState::Streaming)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Streaming => "streaming",
            SessionState::Completed => "completed",
            SessionState::Errored => "error",
        };
        f.write_str(label)
    }
}

/// The task a session is bound to and the connection serving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Binding {
    pub(crate) task_id: TaskId,
    pub(crate) generation: Generation,
    /// Whether the connection for `generation` is still held open.
    pub(crate) live: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionModel {
    binding: Option<Binding>,
    generation: Generation,
    session: SessionState,
    logs: Vec<LogEntry>,
    results: Vec<ResultRecord>,
    error: Option<String>,
    dirty: bool,
}

impl SessionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            logs: self.logs.clone(),
            results: self.results.clone(),
            state: self.session,
            error: self.error.clone(),
        }
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn task_id(&self) -> Option<&TaskId> {
        self.binding.as_ref().map(|binding| &binding.task_id)
    }

    /// Generation of the most recent binding (0 before the first bind).
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Generation of the connection currently held open, if any.
    pub fn live_generation(&self) -> Option<Generation> {
        self.binding
            .as_ref()
            .filter(|binding| binding.live)
            .map(|binding| binding.generation)
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn is_bound_live_to(&self, task_id: &TaskId) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|binding| binding.live && &binding.task_id == task_id)
    }

    /// True when events tagged with `generation` may still mutate the session.
    pub(crate) fn accepts(&self, generation: Generation) -> bool {
        self.live_generation() == Some(generation) && !self.session.is_terminal()
    }

    /// Forgets the current connection, returning its generation if it was live.
    pub(crate) fn release_connection(&mut self) -> Option<Generation> {
        let binding = self.binding.as_mut()?;
        if !binding.live {
            return None;
        }
        binding.live = false;
        Some(binding.generation)
    }

    /// Adopts `task_id` under a fresh generation with empty buffers.
    pub(crate) fn adopt(&mut self, task_id: TaskId) -> Generation {
        self.generation += 1;
        self.binding = Some(Binding {
            task_id,
            generation: self.generation,
            live: true,
        });
        self.reset_buffers(SessionState::Connecting);
        self.generation
    }

    pub(crate) fn clear(&mut self) {
        self.generation += 1;
        self.binding = None;
        self.reset_buffers(SessionState::Idle);
    }

    pub(crate) fn mark_streaming(&mut self) {
        if self.session == SessionState::Connecting {
            self.session = SessionState::Streaming;
            self.dirty = true;
        }
    }

    pub(crate) fn push_log(&mut self, entry: LogEntry) {
        self.logs.push(entry);
        self.dirty = true;
    }

    pub(crate) fn push_result(&mut self, record: ResultRecord) {
        self.results.push(record);
        self.dirty = true;
    }

    pub(crate) fn complete(&mut self) {
        self.session = SessionState::Completed;
        self.dirty = true;
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.session = SessionState::Errored;
        self.error = Some(message);
        self.dirty = true;
    }

    fn reset_buffers(&mut self, session: SessionState) {
        self.session = session;
        self.logs.clear();
        self.results.clear();
        self.error = None;
        self.dirty = true;
    }
}
