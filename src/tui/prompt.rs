//! Blocking modal dialogs for the table controller.

use crate::table::Prompt;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};

enum Dialog<'m> {
    Alert(&'m str),
    Confirm(&'m str),
}

/// Draws the dialog over `backdrop` and blocks on the keyboard until the
/// user answers.
pub(crate) struct TerminalPrompt<'a, B: Backend> {
    terminal: &'a mut Terminal<B>,
    backdrop: &'a dyn Fn(&mut Frame),
}

impl<'a, B: Backend> TerminalPrompt<'a, B> {
    pub fn new(terminal: &'a mut Terminal<B>, backdrop: &'a dyn Fn(&mut Frame)) -> Self {
        Self { terminal, backdrop }
    }

    fn show(&mut self, dialog: &Dialog<'_>) {
        let backdrop = self.backdrop;
        self.terminal
            .draw(|f| {
                backdrop(f);
                draw_dialog(f.area(), f, dialog);
            })
            .ok();
    }
}

/// Block until a key press arrives. `None` if the terminal stops delivering events.
fn next_key() -> Option<(KeyModifiers, KeyCode)> {
    loop {
        match event::read() {
            Ok(Event::Key(k)) if k.kind == KeyEventKind::Press => return Some((k.modifiers, k.code)),
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "reading terminal input failed");
                return None;
            }
        }
    }
}

impl<B: Backend> Prompt for TerminalPrompt<'_, B> {
    fn alert(&mut self, message: &str) {
        tracing::info!(message, "alert");
        self.show(&Dialog::Alert(message));
        while let Some((_, code)) = next_key() {
            if matches!(code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                break;
            }
        }
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.show(&Dialog::Confirm(message));
        let answer = loop {
            match next_key() {
                Some((_, KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter)) => break true,
                Some((_, KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc)) => break false,
                Some((KeyModifiers::CONTROL, KeyCode::Char('c'))) | None => break false,
                Some(_) => {}
            }
        };
        tracing::info!(message, answer, "confirmation");
        answer
    }
}

/// Rect of `width` x `height` centered in `area`, clipped to it.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(area.width.saturating_sub(width) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);
    horizontal[1]
}

fn draw_dialog(area: Rect, f: &mut Frame, dialog: &Dialog<'_>) {
    let (title, message, hint, color) = match dialog {
        Dialog::Alert(m) => ("Alert", *m, "[enter] OK", Color::Yellow),
        Dialog::Confirm(m) => ("Confirm", *m, "[y] Yes   [n] No", Color::Cyan),
    };
    let width = (message.chars().count() as u16 + 6).clamp(30, 70);
    let rect = centered(area, width, 6);

    let p = Paragraph::new(vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(Color::Gray))),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(Span::styled(
                title,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
