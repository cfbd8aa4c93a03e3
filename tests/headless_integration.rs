use std::sync::mpsc;
use std::time::Duration;

use assert_matches::assert_matches;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};
use tempfile::tempdir;

use typeboard::app::{run_session, SessionError};
use typeboard::leaderboard::LeaderboardStore;
use typeboard::runtime::{FixedTicker, Runner, SessionEvent, TestEventSource};
use typeboard::session::TypingSession;

fn key(code: KeyCode) -> SessionEvent {
    SessionEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn chars(s: &str) -> Vec<SessionEvent> {
    s.chars().map(|c| key(KeyCode::Char(c))).collect()
}

fn runner_with(
    events: Vec<SessionEvent>,
) -> (
    Runner<TestEventSource, FixedTicker>,
    mpsc::Sender<SessionEvent>,
) {
    let (tx, rx) = mpsc::channel();
    for ev in events {
        tx.send(ev).unwrap();
    }
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );
    (runner, tx)
}

// Headless run of the real session loop: TestBackend instead of a tty,
// channel-fed events instead of crossterm.
#[test]
fn headless_typing_flow_completes() {
    let mut session = TypingSession::new("hi");
    let (runner, _tx) = runner_with(chars("hi"));
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

    run_session(&mut terminal, &runner, &mut session, 60.0).unwrap();

    assert!(session.has_finished());
    assert_eq!(session.cursor(), 2);
    let score = session.score("ann");
    assert_eq!(score.record.name, "ann");
}

#[test]
fn mismatches_never_advance() {
    let mut session = TypingSession::new("abc");
    let (runner, _tx) = runner_with(chars("axbc"));
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

    run_session(&mut terminal, &runner, &mut session, 60.0).unwrap();

    assert!(session.has_finished());
    assert_eq!(session.keystrokes(), 4);
    assert_eq!(session.mistakes(), 1);
}

#[test]
fn ticks_and_special_keys_are_harmless() {
    let mut session = TypingSession::new("ab");
    let events = vec![
        SessionEvent::Tick,
        key(KeyCode::Char('a')),
        key(KeyCode::Backspace),
        SessionEvent::Resize,
        key(KeyCode::Esc),
        SessionEvent::Tick,
        key(KeyCode::Char('b')),
    ];
    let (runner, _tx) = runner_with(events);
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

    run_session(&mut terminal, &runner, &mut session, 60.0).unwrap();

    assert!(session.has_finished());
    assert_eq!(session.mistakes(), 0);
}

#[test]
fn tab_and_enter_complete_whitespace_text() {
    let mut session = TypingSession::new("a\tb\nc");
    let events = vec![
        key(KeyCode::Char('a')),
        key(KeyCode::Tab),
        key(KeyCode::Char('b')),
        key(KeyCode::Enter),
        key(KeyCode::Char('c')),
    ];
    let (runner, _tx) = runner_with(events);
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

    run_session(&mut terminal, &runner, &mut session, 60.0).unwrap();

    assert!(session.has_finished());
    assert_eq!(session.mistakes(), 0);
}

#[test]
fn closed_input_ends_session_with_error() {
    let mut session = TypingSession::new("abc");
    let (runner, tx) = runner_with(chars("a"));
    drop(tx);
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

    let result = run_session(&mut terminal, &runner, &mut session, 60.0);

    assert_matches!(result, Err(SessionError::InputClosed));
    assert_eq!(session.cursor(), 1);
    assert!(!session.has_finished());
}

#[test]
fn ctrl_c_interrupts_session() {
    let mut session = TypingSession::new("abc");
    let events = vec![
        key(KeyCode::Char('a')),
        SessionEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
    ];
    let (runner, _tx) = runner_with(events);
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

    let result = run_session(&mut terminal, &runner, &mut session, 60.0);

    assert_matches!(result, Err(SessionError::Interrupted));
    assert!(session.is_active());
    assert_eq!(session.cursor(), 1);
}

#[test]
fn final_frame_shows_full_text_typed() {
    let mut session = TypingSession::new("done");
    let (runner, _tx) = runner_with(chars("done"));
    let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();

    run_session(&mut terminal, &runner, &mut session, 60.0).unwrap();

    let content: String = terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|c| c.symbol())
        .collect();
    assert!(content.contains("done"));
    assert!(content.contains("Time left: "));
}

#[test]
fn finished_session_lands_in_leaderboard() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("leaderboard.json");
    let store = LeaderboardStore::open(&path);

    for (name, text) in [("ann", "ab"), ("bob", "abc")] {
        let mut session = TypingSession::new(text);
        let (runner, _tx) = runner_with(chars(text));
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        run_session(&mut terminal, &runner, &mut session, 60.0).unwrap();
        store.add(session.score(name).record);
    }

    // well under a second each, so both are scored over the one-second floor
    let reloaded = LeaderboardStore::open(&path).records();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded[0].name, "ann");
    assert_eq!(reloaded[0].characters_per_minute, 120);
    assert_eq!(reloaded[1].characters_per_minute, 180);

    let table = store.render();
    let bob = table.find("bob").unwrap();
    let ann = table.find("ann").unwrap();
    assert!(bob < ann);
}
