mod help;
mod prompt;
mod state;

use crate::api::HttpUserApi;
use crate::cli::{build_config, Cli};
use crate::model::{Field, PageEvent, PageStatus, User};
use crate::orchestrator::{self, UiCommand};
use crate::table::{DraftSlot, Intent, TableAction, TableController};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use help::draw_help;
use prompt::TerminalPrompt;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs},
    Frame, Terminal,
};
use state::{UiState, TAB_COUNT, TAB_HELP, TAB_HOME, TAB_USERS};
use std::sync::Arc;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub async fn run(args: Cli) -> Result<()> {
    // Unbounded channels keep the UI thread from ever waiting on the controller.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<PageEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let cfg = build_config(&args);
    let api = Arc::new(HttpUserApi::new(&cfg).context("invalid backend configuration")?);

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_handle = std::thread::spawn(move || run_threaded(cfg.default_password, event_rx, cmd_tx));

    let res = orchestrator::run_controller(api, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Side effect requested by a key press.
#[derive(Debug)]
enum Effect {
    None,
    Quit,
    Send(UiCommand),
    Dispatch(TableAction),
}

/// Run the TUI loop on a dedicated thread.
pub fn run_threaded(
    default_password: String,
    mut event_rx: UnboundedReceiver<PageEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState and the table are owned by the UI thread only; no cross-thread mutation.
    let mut state = UiState::default();
    let mut table = TableController::new(default_password);

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    let mut dirty = true;

    let res = loop {
        // Drain events without blocking to keep UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            apply_event(&mut state, &mut table, ev);
            dirty = true;
        }

        if dirty || last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state, &table)).ok();
            last_tick = Instant::now();
            dirty = false;
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if !event::poll(Duration::from_millis(10)).unwrap_or(false) {
            continue;
        }
        let Ok(Event::Key(k)) = event::read() else {
            continue;
        };
        if k.kind != KeyEventKind::Press {
            continue;
        }
        dirty = true;

        match handle_key(&mut state, &table, k.modifiers, k.code) {
            Effect::None => {}
            Effect::Quit => {
                let _ = cmd_tx.send(UiCommand::Quit);
                break Ok(());
            }
            Effect::Send(cmd) => {
                let _ = cmd_tx.send(cmd);
            }
            Effect::Dispatch(action) => {
                let intent = dispatch_with_prompt(&mut terminal, &mut state, &mut table, action);
                if let Some(intent) = intent {
                    state.info = match &intent {
                        Intent::Create(u) => format!("Creating {}…", u.email),
                        Intent::Update(u) => format!("Saving {}…", u.email),
                        Intent::Delete(_) => "Deleting…".into(),
                    };
                    let _ = cmd_tx.send(UiCommand::from(intent));
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn apply_event(state: &mut UiState, table: &mut TableController, ev: PageEvent) {
    match ev {
        PageEvent::Snapshot(snapshot) => {
            state.apply_snapshot(snapshot);
            table.drop_stale_drafts(&state.users, state.status == PageStatus::Ready);
            state.reconcile_focus(table);
        }
        PageEvent::Info(info) => state.info = info,
    }
}

/// Run a table action with dialogs drawn over the current screen.
fn dispatch_with_prompt<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut UiState,
    table: &mut TableController,
    action: TableAction,
) -> Option<Intent> {
    let intent = {
        let backdrop_table = table.clone();
        let view: &UiState = state;
        let backdrop: &dyn Fn(&mut Frame) = &|f| draw(f.area(), f, view, &backdrop_table);
        let mut prompt = TerminalPrompt::new(terminal, backdrop);
        table.dispatch(action, &view.users, &mut prompt)
    };
    state.reconcile_focus(table);
    intent
}

fn handle_key(
    state: &mut UiState,
    table: &TableController,
    modifiers: KeyModifiers,
    code: KeyCode,
) -> Effect {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Effect::Quit;
    }
    if let Some((slot, field)) = state.focus {
        return handle_draft_key(state, table, slot, field, code);
    }

    match code {
        KeyCode::Char('q') => Effect::Quit,
        KeyCode::Tab => {
            state.tab = (state.tab + 1) % TAB_COUNT;
            Effect::None
        }
        KeyCode::BackTab => {
            state.tab = (state.tab + TAB_COUNT - 1) % TAB_COUNT;
            Effect::None
        }
        KeyCode::Char('?') => {
            state.tab = TAB_HELP;
            Effect::None
        }
        KeyCode::Char('r') => {
            state.info = "Reload requested…".into();
            Effect::Send(UiCommand::Reload)
        }
        KeyCode::Enter if state.tab == TAB_HOME => {
            state.tab = TAB_USERS;
            Effect::None
        }
        _ if state.tab == TAB_USERS && state.status == PageStatus::Ready => {
            handle_users_key(state, table, code)
        }
        _ => Effect::None,
    }
}

fn handle_users_key(state: &mut UiState, table: &TableController, code: KeyCode) -> Effect {
    match code {
        KeyCode::Char(c @ '1'..='5') => {
            let idx = c as usize - '1' as usize;
            Effect::Dispatch(TableAction::SetSort(Field::ALL[idx]))
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.selected = state.selected.saturating_sub(1);
            Effect::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.selected + 1 < state.users.len() {
                state.selected += 1;
            }
            Effect::None
        }
        KeyCode::Char('n') => {
            state.focus = Some((DraftSlot::Create, Field::FirstName));
            Effect::Dispatch(TableAction::BeginCreate)
        }
        KeyCode::Char('e') => match state.selected_user(table) {
            Some(user) if user.id.is_some() => {
                let user = user.clone();
                state.focus = Some((DraftSlot::Edit, Field::FirstName));
                Effect::Dispatch(TableAction::BeginEdit(user))
            }
            _ => Effect::None,
        },
        KeyCode::Char('d') => match state.selected_user(table).and_then(|u| u.id.clone()) {
            Some(id) => Effect::Dispatch(TableAction::RequestDelete(id)),
            None => Effect::None,
        },
        _ => Effect::None,
    }
}

fn handle_draft_key(
    state: &mut UiState,
    table: &TableController,
    slot: DraftSlot,
    field: Field,
    code: KeyCode,
) -> Effect {
    let current = table
        .draft(slot)
        .map(|d| d.field(field).to_string())
        .unwrap_or_default();
    match code {
        KeyCode::Esc => Effect::Dispatch(TableAction::Cancel(slot)),
        KeyCode::Enter => Effect::Dispatch(match slot {
            DraftSlot::Create => TableAction::SubmitCreate,
            DraftSlot::Edit => TableAction::SubmitEdit,
        }),
        KeyCode::Tab => {
            state.focus = Some((slot, field.next()));
            Effect::None
        }
        KeyCode::BackTab => {
            state.focus = Some((slot, field.prev()));
            Effect::None
        }
        KeyCode::Backspace => {
            let mut value = current;
            value.pop();
            Effect::Dispatch(TableAction::Input { slot, field, value })
        }
        KeyCode::Char(c) => {
            let mut value = current;
            value.push(c);
            Effect::Dispatch(TableAction::Input { slot, field, value })
        }
        _ => Effect::None,
    }
}

fn draw(area: Rect, f: &mut Frame, state: &UiState, table: &TableController) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![Line::from("Home"), Line::from("Users"), Line::from("Help")])
        .select(state.tab)
        .block(Block::default().borders(Borders::ALL).title("user-admin"))
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        TAB_HOME => draw_home(chunks[1], f),
        TAB_USERS => draw_users(chunks[1], f, state, table),
        _ => draw_help(chunks[1], f),
    }

    draw_status(chunks[2], f, state);
}

fn draw_home(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Home Page",
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("enter", Style::default().fg(Color::Magenta)),
            Span::raw(" to open the "),
            Span::styled(
                "user list",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ]),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

fn header_label(field: Field, table: &TableController) -> String {
    if table.sort_column() == field {
        format!("{} {}", field.label(), table.sort_direction().arrow())
    } else {
        field.label().to_string()
    }
}

/// Input cells for a draft row; the focused cell gets a cursor.
fn draft_cells(
    draft: &User,
    slot: DraftSlot,
    focus: Option<(DraftSlot, Field)>,
) -> Vec<Cell<'static>> {
    let mut cells: Vec<Cell> = Field::ALL
        .iter()
        .map(|field| {
            let value = draft.field(*field);
            let focused = focus == Some((slot, *field));
            let line = match (value.is_empty(), focused) {
                (true, false) => Line::from(Span::styled(
                    field.label(),
                    Style::default().fg(Color::DarkGray),
                )),
                (_, true) => Line::from(vec![
                    Span::raw(value.to_string()),
                    Span::styled("▏", Style::default().fg(Color::Yellow)),
                ]),
                (false, false) => Line::from(value.to_string()),
            };
            let style = if focused {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Cell::from(line).style(style)
        })
        .collect();
    cells.push(Cell::from(Span::styled(
        "[enter] save  [esc] cancel",
        Style::default().fg(Color::Green),
    )));
    cells
}

fn draw_users(area: Rect, f: &mut Frame, state: &UiState, table: &TableController) {
    let block = Block::default().borders(Borders::ALL).title("Users");
    match &state.status {
        PageStatus::Loading => {
            f.render_widget(Paragraph::new("Loading...").block(block), area);
            return;
        }
        PageStatus::Failed(msg) => {
            let p = Paragraph::new(Span::styled(msg.clone(), Style::default().fg(Color::Red)))
                .block(block);
            f.render_widget(p, area);
            return;
        }
        PageStatus::Ready => {}
    }

    let mut header: Vec<Cell> = Field::ALL
        .iter()
        .map(|field| Cell::from(header_label(*field, table)))
        .collect();
    header.push(Cell::from("Actions"));
    let header = Row::new(header).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let mut rows: Vec<Row> = Vec::new();
    if let Some(draft) = table.new_draft() {
        rows.push(Row::new(draft_cells(draft, DraftSlot::Create, state.focus)));
    }
    let offset = rows.len();
    for user in table.sorted(&state.users) {
        if table.is_editing(user) {
            if let Some(draft) = table.edit_draft() {
                rows.push(Row::new(draft_cells(draft, DraftSlot::Edit, state.focus)));
                continue;
            }
        }
        let mut cells: Vec<Cell> = Field::ALL
            .iter()
            .map(|field| Cell::from(user.field(*field).to_string()))
            .collect();
        cells.push(Cell::from(Span::styled(
            "[e]dit [d]elete",
            Style::default().fg(Color::Gray),
        )));
        rows.push(Row::new(cells));
    }

    let widths = [
        Constraint::Percentage(14),
        Constraint::Percentage(14),
        Constraint::Percentage(12),
        Constraint::Percentage(14),
        Constraint::Percentage(24),
        Constraint::Percentage(22),
    ];
    let title = format!("Users ({})", state.users.len());
    let t = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut ts = TableState::default();
    if state.focus.is_none() && !state.users.is_empty() {
        ts.select(Some(state.selected + offset));
    }
    f.render_stateful_widget(t, area, &mut ts);
}

fn draw_status(area: Rect, f: &mut Frame, state: &UiState) {
    let mut spans = vec![
        Span::styled("q", Style::default().fg(Color::Magenta)),
        Span::raw(" quit  "),
        Span::styled("?", Style::default().fg(Color::Magenta)),
        Span::raw(" help  "),
    ];
    if let Some(at) = state.refreshed_at.as_deref() {
        spans.push(Span::styled(
            format!("refreshed {at}  "),
            Style::default().fg(Color::Gray),
        ));
    }
    spans.push(Span::raw(state.info.clone()));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
#[path = "../tests/tui_tests.rs"]
mod tests;
