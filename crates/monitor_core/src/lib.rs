//! Monitor core: pure session state machine and view-model helpers.
mod effect;
mod entry;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use entry::{
    parse_done_summary, parse_error_message, parse_log_entry, parse_result_record, DoneSummary,
    LogEntry, LogLevel, ResultRecord, UNKNOWN_ERROR,
};
pub use msg::Msg;
pub use state::{Generation, SessionModel, SessionState, TaskId};
pub use update::{update, CONNECTION_LOST};
pub use view_model::SessionView;
