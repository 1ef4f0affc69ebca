use monitor_engine::{SseDecoder, SseFrame, DEFAULT_EVENT};
use pretty_assertions::assert_eq;

fn frame(event: &str, data: &str) -> SseFrame {
    SseFrame {
        event: event.to_string(),
        data: data.to_string(),
    }
}

#[test]
fn decodes_named_events_in_order() {
    let mut decoder = SseDecoder::new();
    let frames = decoder.push(
        b"event: log\ndata: {\"message\":\"a\"}\n\nevent: result\ndata: {\"name\":\"b\"}\n\n",
    );

    assert_eq!(
        frames,
        vec![
            frame("log", r#"{"message":"a"}"#),
            frame("result", r#"{"name":"b"}"#),
        ]
    );
}

#[test]
fn reassembles_lines_split_across_chunks() {
    let mut decoder = SseDecoder::new();
    assert!(decoder.push(b"eve").is_empty());
    assert!(decoder.push(b"nt: done\nda").is_empty());
    assert!(decoder.push(b"ta: {}\n").is_empty());

    assert_eq!(decoder.push(b"\n"), vec![frame("done", "{}")]);
}

#[test]
fn keeps_utf8_sequences_split_across_chunks() {
    let payload = "data: {\"message\":\"Terminé\"}\n\n".as_bytes();
    let split = payload
        .iter()
        .position(|byte| *byte == 0xC3)
        .expect("multi-byte char")
        + 1;
    let mut decoder = SseDecoder::new();

    assert!(decoder.push(&payload[..split]).is_empty());
    assert_eq!(
        decoder.push(&payload[split..]),
        vec![frame(DEFAULT_EVENT, r#"{"message":"Terminé"}"#)]
    );
}

#[test]
fn skips_comments_and_ignored_fields() {
    let mut decoder = SseDecoder::new();
    let frames = decoder.push(b": keepalive\n\nid: 7\nretry: 1000\nevent: log\ndata: x\n\n");

    assert_eq!(frames, vec![frame("log", "x")]);
}

#[test]
fn handles_crlf_and_multiline_data() {
    let mut decoder = SseDecoder::new();
    let frames = decoder.push(b"event: log\r\ndata: one\r\ndata:two\r\n\r\n");

    assert_eq!(frames, vec![frame("log", "one\ntwo")]);
}

#[test]
fn frames_without_data_are_not_dispatched() {
    let mut decoder = SseDecoder::new();
    assert!(decoder.push(b"event: done\n\n").is_empty());
    // The event name does not leak into the next frame.
    assert_eq!(decoder.push(b"data: y\n\n"), vec![frame(DEFAULT_EVENT, "y")]);
}

#[test]
fn finish_discards_unterminated_frame() {
    let mut decoder = SseDecoder::new();
    assert!(decoder.push(b"event: done\ndata: {}").is_empty());
    assert!(decoder.finish());
    assert!(!decoder.finish());

    let mut decoder = SseDecoder::new();
    assert!(decoder.push(b"event: error\ndata: {\"message\":\"half\"}\n").is_empty());
    assert!(decoder.finish());
    // Nothing from the dropped frame leaks into a later one.
    assert_eq!(decoder.push(b"data: z\n\n"), vec![frame(DEFAULT_EVENT, "z")]);
}

#[test]
fn finish_after_complete_frames_has_nothing_to_drop() {
    let mut decoder = SseDecoder::new();
    assert_eq!(decoder.push(b"event: done\ndata: {}\n\n"), vec![frame("done", "{}")]);

    assert!(!decoder.finish());
}
