mod fixture;

use pretty_assertions::assert_eq;
use tape_log::{LogHistory, LogLine, SharedSink, StreamKey, StreamRegistry};

fn ledger(name: &str) -> (LogHistory, SharedSink) {
    let registry = StreamRegistry::new();
    let sink = SharedSink::new();
    let handle = registry.bind_with(StreamKey::named(name), || sink.boxed());
    (LogHistory::from_handle(handle), sink)
}

fn assert_golden(actual: &str, fixture_name: &str) {
    let expected = fixture::read_unescaped(fixture_name);
    assert_eq!(fixture::escape(actual), fixture::escape(&expected));
}

#[test]
fn golden_first_draw_without_anchor_appends() {
    let (history, sink) = ledger("first-draw");
    let session = history.begin_interactive_session();
    history.write("x\n").expect("write");
    history.write("y\n").expect("write");
    history
        .do_interactive_write(session, || history.write("p1"))
        .expect("rewrite");

    assert_golden(&sink.contents(), "scenario_b_first_draw.txt");
    let lines = history.history();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[2], LogLine::new(Some(session), "p1"));
}

#[test]
fn golden_unchanged_line_below_is_skipped() {
    let (history, sink) = ledger("replay-unchanged");
    let session = history.begin_interactive_session();
    history
        .do_interactive_write(session, || history.write("p1\n"))
        .expect("first draw");
    history.write("LOG\n").expect("plain write");
    history
        .do_interactive_write(session, || history.write("p2\n"))
        .expect("redraw");

    assert_golden(&sink.contents(), "scenario_c_replay_unchanged.txt");
    assert_eq!(
        history.history(),
        vec![
            LogLine::new(Some(session), "p2\n"),
            LogLine::new(None, "LOG\n"),
        ]
    );
}

#[test]
fn golden_anchor_below_plain_lines_skips_unchanged_replay() {
    let (history, sink) = ledger("anchor-below-plain");
    let session = history.begin_interactive_session();
    history.write("pre\n").expect("plain write");
    history
        .do_interactive_write(session, || history.write("p1\n"))
        .expect("first draw");
    history.write("LOG\n").expect("plain write");
    history
        .do_interactive_write(session, || history.write("p2\n"))
        .expect("redraw");

    assert_golden(&sink.contents(), "rewrite_below_plain_lines.txt");
    assert_eq!(
        history.history(),
        vec![
            LogLine::new(None, "pre\n"),
            LogLine::new(Some(session), "p2\n"),
            LogLine::new(None, "LOG\n"),
        ]
    );
}

#[test]
fn golden_growing_session_redraws_line_below() {
    let (history, sink) = ledger("replay-grow");
    let session = history.begin_interactive_session();
    history
        .do_interactive_write(session, || history.write("p1\n"))
        .expect("first draw");
    history.write("LOG\n").expect("plain write");
    history
        .do_interactive_write(session, || history.write("p2\nq2\n"))
        .expect("redraw");

    assert_golden(&sink.contents(), "rewrite_grows_replays_below.txt");
    assert_eq!(
        history.history(),
        vec![
            LogLine::new(Some(session), "p2\n"),
            LogLine::new(Some(session), "q2\n"),
            LogLine::new(None, "LOG\n"),
        ]
    );
}

#[test]
fn golden_two_sessions_keep_their_rows() {
    let (history, sink) = ledger("two-sessions");
    let a = history.begin_interactive_session();
    let b = history.begin_interactive_session();
    history
        .do_interactive_write(a, || history.write("a1\n"))
        .expect("a draw");
    history
        .do_interactive_write(b, || history.write("b1\n"))
        .expect("b draw");
    history
        .do_interactive_write(a, || history.write("a2\n"))
        .expect("a redraw");

    assert_golden(&sink.contents(), "two_sessions_interleaved.txt");
    assert_eq!(
        history.history(),
        vec![LogLine::new(Some(a), "a2\n"), LogLine::new(Some(b), "b1\n")]
    );
}
