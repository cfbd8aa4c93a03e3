use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::session::TypingSession;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// The typing screen: target text, colored progress and the countdown.
pub struct TypingView<'a> {
    pub session: &'a TypingSession,
    pub countdown_secs: f64,
}

impl<'a> TypingView<'a> {
    pub fn new(session: &'a TypingSession, countdown_secs: f64) -> Self {
        Self {
            session,
            countdown_secs,
        }
    }

    fn progress_line(&self) -> Line<'static> {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);
        let underlined_dim_bold_style = Style::default()
            .patch(dim_bold_style)
            .add_modifier(Modifier::UNDERLINED);

        let mut spans = vec![Span::styled(self.session.typed(), green_bold_style)];
        if let Some(expected) = self.session.expected_char() {
            spans.push(Span::styled(
                expected.to_string(),
                underlined_dim_bold_style,
            ));
        }
        spans.push(Span::styled(self.session.remaining(), dim_bold_style));
        Line::from(spans)
    }
}

impl Widget for TypingView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let text = self.session.text();
        let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
        let text_lines = ((text.width() as f64 / max_chars_per_line as f64).ceil() as u16).max(1);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(2),              // heading
                Constraint::Length(text_lines + 1), // target text
                Constraint::Length(text_lines + 1), // progress
                Constraint::Length(1),              // countdown
                Constraint::Min(0),
            ])
            .split(area);

        Paragraph::new(Span::styled("Type the text:", bold_style)).render(chunks[0], buf);

        Paragraph::new(text)
            .style(italic_style)
            .wrap(Wrap { trim: false })
            .render(chunks[1], buf);

        Paragraph::new(self.progress_line())
            .wrap(Wrap { trim: false })
            .render(chunks[2], buf);

        let remaining = self.session.seconds_remaining(self.countdown_secs);
        let countdown_style = if remaining > 0.0 {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            Style::default().fg(Color::Red)
        };
        Paragraph::new(Span::styled(
            format!("Time left: {:.1}s", remaining),
            countdown_style,
        ))
        .render(chunks[3], buf);
    }
}
