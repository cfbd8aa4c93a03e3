use std::time::{Duration, Instant};

use crate::leaderboard::ScoreRecord;
use crate::runtime::COUNTDOWN_TICK;

/// Shortest elapsed time a score is computed over. Finishing faster than one
/// countdown tick is scored as if it took one tick.
pub const MIN_ELAPSED: Duration = COUNTDOWN_TICK;

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Active,
    Finished,
}

/// One pass over the target text.
///
/// Only a correct key moves the cursor; a wrong key is dropped and the same
/// character is expected again. The session ends when the cursor reaches the
/// end of the text and not before.
#[derive(Debug, Clone)]
pub struct TypingSession {
    text: Vec<char>,
    cursor: usize,
    phase: Phase,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
    keystrokes: usize,
    mistakes: usize,
}

impl TypingSession {
    /// Carriage returns are dropped from `text`; Enter types `'\n'`.
    pub fn new(text: impl AsRef<str>) -> Self {
        Self {
            text: text.as_ref().chars().filter(|&c| c != '\r').collect(),
            cursor: 0,
            phase: Phase::Idle,
            started_at: None,
            finished_at: None,
            keystrokes: 0,
            mistakes: 0,
        }
    }

    /// Reset the clock and begin accepting keys.
    pub fn start(&mut self) {
        let now = Instant::now();
        self.cursor = 0;
        self.keystrokes = 0;
        self.mistakes = 0;
        self.started_at = Some(now);
        self.finished_at = None;
        self.phase = Phase::Active;

        if self.text.is_empty() {
            self.finish(now);
        }
    }

    /// Feed one typed character. Returns `None` unless the session is active.
    pub fn write(&mut self, c: char) -> Option<Outcome> {
        if self.phase != Phase::Active {
            return None;
        }

        self.keystrokes += 1;
        if self.text[self.cursor] != c {
            self.mistakes += 1;
            return Some(Outcome::Incorrect);
        }

        self.cursor += 1;
        if self.cursor == self.text.len() {
            self.finish(Instant::now());
        }
        Some(Outcome::Correct)
    }

    fn finish(&mut self, at: Instant) {
        self.finished_at = Some(at);
        self.phase = Phase::Finished;
    }

    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    pub fn typed(&self) -> String {
        self.text[..self.cursor].iter().collect()
    }

    /// Text after the expected character.
    pub fn remaining(&self) -> String {
        let from = (self.cursor + 1).min(self.text.len());
        self.text[from..].iter().collect()
    }

    pub fn expected_char(&self) -> Option<char> {
        self.text.get(self.cursor).copied()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn has_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn keystrokes(&self) -> usize {
        self.keystrokes
    }

    pub fn mistakes(&self) -> usize {
        self.mistakes
    }

    pub fn elapsed(&self) -> Duration {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }

    /// Countdown value for display. Goes negative once the budget is spent;
    /// the session keeps running regardless.
    pub fn seconds_remaining(&self, budget_secs: f64) -> f64 {
        budget_secs - self.elapsed().as_secs_f64()
    }

    pub fn score(&self, name: impl Into<String>) -> Score {
        Score::compute(name, &self.text(), self.elapsed())
    }
}

/// Speed for one finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub record: ScoreRecord,
    pub chars_per_minute: f64,
    pub chars_per_second: f64,
    pub elapsed: Duration,
}

impl Score {
    /// Speed is the alphanumeric character count of the *target* text over
    /// the elapsed time, so mistakes only cost time.
    pub fn compute(name: impl Into<String>, text: &str, elapsed: Duration) -> Self {
        let elapsed = elapsed.max(MIN_ELAPSED);
        let chars = scored_chars(text) as f64;

        let secs = elapsed.as_secs_f64();
        let chars_per_second = chars / secs;
        let chars_per_minute = chars * 60.0 / secs;

        Self {
            record: ScoreRecord::new(
                name,
                chars_per_minute.floor() as u32,
                chars_per_second.floor() as u32,
            ),
            chars_per_minute,
            chars_per_second,
            elapsed,
        }
    }
}

/// Letters and decimal digits. Numeric letters such as `Ⅻ` and other
/// numerals such as `²` are not counted. Digits are ASCII only; other
/// scripts' decimal digits are skipped.
pub fn scored_chars(text: &str) -> usize {
    text.chars().filter(|&c| is_scored(c)).count()
}

fn is_scored(c: char) -> bool {
    (c.is_alphabetic() && !c.is_numeric()) || c.is_ascii_digit()
}
