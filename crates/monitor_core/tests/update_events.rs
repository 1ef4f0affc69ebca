use std::sync::Once;

use monitor_core::{
    update, Effect, LogEntry, LogLevel, Msg, ResultRecord, SessionModel, SessionState, TaskId,
    UNKNOWN_ERROR,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(monitor_logging::initialize_for_tests);
}

fn event(generation: u64, name: &str, data: &str) -> Msg {
    Msg::StreamEvent {
        generation,
        event: name.to_string(),
        data: data.to_string(),
    }
}

fn streaming(task: &str) -> SessionModel {
    let (state, _) = update(SessionModel::new(), Msg::Bind(Some(TaskId::from(task))));
    let (state, _) = update(state, Msg::TransportOpened { generation: 1 });
    assert_eq!(state.session(), SessionState::Streaming);
    state
}

fn apply_all(state: SessionModel, msgs: Vec<Msg>) -> (SessionModel, Vec<Effect>) {
    msgs.into_iter()
        .fold((state, Vec::new()), |(state, mut effects), msg| {
            let (state, new_effects) = update(state, msg);
            effects.extend(new_effects);
            (state, effects)
        })
}

#[test]
fn logs_and_results_keep_arrival_order_and_skip_malformed() {
    init_logging();
    let (state, effects) = apply_all(
        streaming("t1"),
        vec![
            event(1, "log", r#"{"level":"INFO","message":"a"}"#),
            event(1, "result", r#"{"name":"First","email":"f@x.com"}"#),
            event(1, "log", "{not json"),
            event(1, "log", r#"{"level":"warning","message":"b"}"#),
            event(1, "result", r#"{"website":"https://nameless.example"}"#),
            event(1, "result", r#"{"name":"First","email":"f@x.com"}"#),
            event(1, "log", r#"{"level":"DEBUG","message":"c"}"#),
        ],
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.state, SessionState::Streaming);
    assert_eq!(
        view.logs,
        vec![
            LogEntry {
                level: LogLevel::Info,
                message: "a".to_string(),
            },
            LogEntry {
                level: LogLevel::Warning,
                message: "b".to_string(),
            },
            LogEntry {
                level: LogLevel::Other("DEBUG".to_string()),
                message: "c".to_string(),
            },
        ]
    );
    // Duplicates are kept.
    assert_eq!(view.results.len(), 2);
    assert_eq!(view.results[0], view.results[1]);
}

#[test]
fn unknown_event_names_are_ignored() {
    init_logging();
    let state = streaming("t1");
    let before = state.view();

    let (state, effects) = update(state, event(1, "message", r#"{"message":"hi"}"#));

    assert!(effects.is_empty());
    assert_eq!(state.view(), before);
}

#[test]
fn open_only_promotes_from_connecting() {
    init_logging();
    let state = streaming("t1");
    let (state, _) = update(state, event(1, "done", "{}"));

    let (state, effects) = update(state, Msg::TransportOpened { generation: 1 });

    assert!(effects.is_empty());
    assert_eq!(state.session(), SessionState::Completed);
}

#[test]
fn data_before_open_promotes_to_streaming() {
    init_logging();
    let (state, _) = update(SessionModel::new(), Msg::Bind(Some(TaskId::from("t1"))));

    let (state, _) = update(state, event(1, "log", r#"{"message":"early"}"#));

    assert_eq!(state.session(), SessionState::Streaming);
    assert_eq!(state.view().logs.len(), 1);
}

#[test]
fn error_event_without_message_uses_placeholder() {
    init_logging();
    let (state, effects) = update(streaming("t1"), event(1, "error", "{}"));

    assert_eq!(effects, vec![Effect::CloseStream { generation: 1 }]);
    assert_eq!(state.session(), SessionState::Errored);
    assert_eq!(state.view().error.as_deref(), Some(UNKNOWN_ERROR));
}

#[test]
fn transport_loss_after_terminal_state_is_noop() {
    init_logging();
    let (state, _) = update(streaming("t1"), event(1, "done", "{}"));
    let before = state.clone();

    let (state, effects) = update(
        state,
        Msg::TransportLost {
            generation: 1,
            reason: "eof".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state, before);
    assert_eq!(state.view().error, None);
}

#[test]
fn terminal_states_freeze_every_field() {
    init_logging();
    let (completed, _) = update(streaming("t1"), event(1, "done", "{}"));
    let (errored, _) = update(
        streaming("t1"),
        event(1, "error", r#"{"message":"quota exceeded"}"#),
    );

    for state in [completed, errored] {
        let before = state.view();
        let (state, effects) = apply_all(
            state,
            vec![
                event(1, "log", r#"{"message":"late"}"#),
                event(1, "result", r#"{"name":"Late"}"#),
                event(1, "error", r#"{"message":"other"}"#),
                event(1, "done", "{}"),
                Msg::TransportOpened { generation: 1 },
                Msg::TransportLost {
                    generation: 1,
                    reason: "late".to_string(),
                },
            ],
        );
        assert!(effects.is_empty());
        assert_eq!(state.view(), before);
    }
}

#[test]
fn stale_generation_never_touches_new_binding() {
    init_logging();
    let (state, _) = update(SessionModel::new(), Msg::Bind(Some(TaskId::from("t1"))));
    let (state, _) = update(state, Msg::Bind(Some(TaskId::from("t2"))));
    let (state, _) = update(state, Msg::TransportOpened { generation: 2 });

    let (state, effects) = apply_all(
        state,
        vec![
            Msg::TransportOpened { generation: 1 },
            event(1, "log", r#"{"message":"stale"}"#),
            event(1, "result", r#"{"name":"Stale"}"#),
            event(1, "done", "{}"),
            Msg::TransportLost {
                generation: 1,
                reason: "closed".to_string(),
            },
        ],
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.state, SessionState::Streaming);
    assert!(view.logs.is_empty());
    assert!(view.results.is_empty());
    assert_eq!(view.error, None);
}

#[test]
fn well_formed_result_fields_are_preserved() {
    init_logging();
    let payload = concat!(
        r#"{"nom":"Salon Zen","website":"https://zen.fr","#,
        r#""email":"hi@zen.fr","telephone":"0611"}"#,
    );
    let (state, _) = update(streaming("t1"), event(1, "result", payload));

    assert_eq!(
        state.view().results,
        vec![ResultRecord {
            name: "Salon Zen".to_string(),
            website: Some("https://zen.fr".to_string()),
            email: Some("hi@zen.fr".to_string()),
            phone: Some("0611".to_string()),
        }]
    );
    assert_eq!(state.view().error, None);
}

#[test]
fn session_runs_from_bind_until_a_terminal_event() {
    init_logging();
    let idle = SessionModel::new();
    assert!(!idle.session().is_running());

    let (connecting, _) = update(idle, Msg::Bind(Some(TaskId::from("t1"))));
    assert!(connecting.session().is_running());
    let (streaming, _) = update(connecting, Msg::TransportOpened { generation: 1 });
    assert!(streaming.session().is_running());

    let (completed, _) = update(streaming.clone(), event(1, "done", "{}"));
    let (errored, _) = update(
        streaming,
        Msg::TransportLost {
            generation: 1,
            reason: "eof".to_string(),
        },
    );
    for state in [completed, errored] {
        assert!(state.session().is_terminal());
        assert!(!state.session().is_running());
    }
}
