use monitor_logging::{monitor_debug, monitor_info, monitor_warn};

use crate::entry::{parse_done_summary, parse_error_message, parse_log_entry, parse_result_record};
use crate::{Effect, Generation, Msg, SessionModel, SessionState};

/// Message shown when the transport drops before a terminal event.
pub const CONNECTION_LOST: &str = "connection lost";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: SessionModel, msg: Msg) -> (SessionModel, Vec<Effect>) {
    let effects = match msg {
        Msg::Bind(Some(task_id)) => {
            if state.is_bound_live_to(&task_id) {
                return (state, Vec::new());
            }
            let mut effects = Vec::with_capacity(2);
            if let Some(generation) = state.release_connection() {
                effects.push(Effect::CloseStream { generation });
            }
            let generation = state.adopt(task_id.clone());
            monitor_info!("Binding task {} as generation {}", task_id, generation);
            effects.push(Effect::OpenStream {
                generation,
                task_id,
            });
            effects
        }
        Msg::Bind(None) => {
            if state.task_id().is_none() && state.session() == SessionState::Idle {
                return (state, Vec::new());
            }
            let close = state.release_connection();
            state.clear();
            close
                .map(|generation| Effect::CloseStream { generation })
                .into_iter()
                .collect()
        }
        Msg::Dispose => state
            .release_connection()
            .map(|generation| Effect::CloseStream { generation })
            .into_iter()
            .collect(),
        Msg::TransportOpened { generation } => {
            if state.accepts(generation) {
                state.mark_streaming();
            } else {
                log_stale("open", generation, &state);
            }
            Vec::new()
        }
        Msg::StreamEvent {
            generation,
            event,
            data,
        } => {
            if !state.accepts(generation) {
                log_stale(&event, generation, &state);
                return (state, Vec::new());
            }
            apply_stream_event(&mut state, generation, &event, &data)
        }
        Msg::TransportLost { generation, reason } => {
            if !state.accepts(generation) {
                log_stale("transport loss", generation, &state);
                return (state, Vec::new());
            }
            monitor_warn!("Stream generation {} lost: {}", generation, reason);
            state.fail(CONNECTION_LOST.to_string());
            close_current(&mut state)
        }
    };

    (state, effects)
}

fn apply_stream_event(
    state: &mut SessionModel,
    generation: Generation,
    event: &str,
    data: &str,
) -> Vec<Effect> {
    match event {
        "log" => {
            match parse_log_entry(data) {
                Ok(entry) => {
                    state.mark_streaming();
                    state.push_log(entry);
                }
                Err(err) => monitor_warn!("Dropping malformed log event: {} ({})", err, data),
            }
            Vec::new()
        }
        "result" => {
            match parse_result_record(data) {
                Ok(record) => {
                    state.mark_streaming();
                    state.push_result(record);
                }
                Err(err) => monitor_warn!("Dropping malformed result event: {} ({})", err, data),
            }
            Vec::new()
        }
        "done" => {
            let summary = parse_done_summary(data);
            monitor_info!(
                "Stream generation {} done: {} (total {:?})",
                generation,
                summary.message.as_deref().unwrap_or("no message"),
                summary.total
            );
            state.complete();
            close_current(state)
        }
        "error" => {
            let message = parse_error_message(data);
            monitor_warn!("Stream generation {} reported error: {}", generation, message);
            state.fail(message);
            close_current(state)
        }
        other => {
            monitor_debug!("Ignoring unknown event '{}' on generation {}", other, generation);
            Vec::new()
        }
    }
}

fn close_current(state: &mut SessionModel) -> Vec<Effect> {
    state
        .release_connection()
        .map(|generation| Effect::CloseStream { generation })
        .into_iter()
        .collect()
}

fn log_stale(what: &str, generation: Generation, state: &SessionModel) {
    monitor_debug!(
        "Discarding {} from generation {} (current {}, state {})",
        what,
        generation,
        state.generation(),
        state.session()
    );
}
