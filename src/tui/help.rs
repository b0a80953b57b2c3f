use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn key_line(key: &'static str, pad: usize, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(format!("{:pad$}{what}", "", pad = pad)),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("q", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit"),
        ]),
        key_line("tab", 9, "Switch tabs"),
        key_line("?", 11, "Show this help"),
        key_line("r", 11, "Reload user list"),
        Line::from(""),
        Line::from("Users tab:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("↑/↓", Style::default().fg(Color::Magenta)),
            Span::raw(" or "),
            Span::styled("j/k", Style::default().fg(Color::Magenta)),
            Span::raw("  Navigate"),
        ]),
        key_line("1-5", 9, "Sort by column (again to reverse)"),
        key_line("n", 11, "New user"),
        key_line("e", 11, "Edit selected"),
        key_line("d", 11, "Delete selected"),
        Line::from(""),
        Line::from("While editing a row:"),
        key_line("tab", 9, "Next field (shift-tab: previous)"),
        key_line("enter", 7, "Save"),
        key_line("esc", 9, "Cancel"),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
