use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, Terminal};
use thiserror::Error;

use crate::runtime::{Runner, SessionEvent, SessionEventSource, Ticker};
use crate::session::TypingSession;
use crate::ui::TypingView;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("typing session interrupted")]
    Interrupted,

    #[error("keyboard input closed before the text was finished")]
    InputClosed,

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// What a key press means to a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Type(char),
    Interrupt,
    Ignore,
}

pub fn key_action(key: &KeyEvent) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::Ignore;
    }
    match key.code {
        // raw mode swallows SIGINT, so ctrl+c has to be handled here
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            KeyAction::Interrupt
        }
        KeyCode::Char(c) => KeyAction::Type(c),
        KeyCode::Tab => KeyAction::Type('\t'),
        KeyCode::Enter => KeyAction::Type('\n'),
        _ => KeyAction::Ignore,
    }
}

/// Start `session` and drive it until the whole text has been typed.
///
/// The countdown is redrawn on every tick and every key; the session itself
/// only ends on completion, ctrl+c, or the key source closing.
pub fn run_session<B, E, T>(
    terminal: &mut Terminal<B>,
    runner: &Runner<E, T>,
    session: &mut TypingSession,
    countdown_secs: f64,
) -> Result<(), SessionError>
where
    B: Backend,
    E: SessionEventSource,
    T: Ticker,
{
    session.start();
    tracing::debug!(chars = session.len(), "typing session started");

    while !session.has_finished() {
        terminal.draw(|f| {
            f.render_widget(TypingView::new(&*session, countdown_secs), f.area())
        })?;

        match runner.step() {
            SessionEvent::Tick | SessionEvent::Resize => {}
            SessionEvent::Closed => return Err(SessionError::InputClosed),
            SessionEvent::Key(key) => match key_action(&key) {
                KeyAction::Type(c) => {
                    session.write(c);
                }
                KeyAction::Interrupt => return Err(SessionError::Interrupted),
                KeyAction::Ignore => {}
            },
        }
    }

    terminal.draw(|f| {
        f.render_widget(TypingView::new(&*session, countdown_secs), f.area())
    })?;
    tracing::debug!(
        elapsed_ms = session.elapsed().as_millis() as u64,
        keystrokes = session.keystrokes(),
        mistakes = session.mistakes(),
        "typing session finished"
    );
    Ok(())
}
