use crate::{LogEntry, ResultRecord, SessionState};

/// Read-only snapshot handed to consumers of a session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionView {
    pub logs: Vec<LogEntry>,
    pub results: Vec<ResultRecord>,
    pub state: SessionState,
    pub error: Option<String>,
}
