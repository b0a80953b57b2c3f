use super::*;
use crate::model::PageSnapshot;
use crate::table::Prompt;
use ratatui::backend::TestBackend;

struct NoDialogs;

impl Prompt for NoDialogs {
    fn alert(&mut self, message: &str) {
        panic!("unexpected alert: {message}");
    }

    fn confirm(&mut self, message: &str) -> bool {
        panic!("unexpected confirm: {message}");
    }
}

fn user(id: &str, first: &str, email: &str) -> User {
    User {
        id: Some(id.into()),
        first_name: first.into(),
        last_name: "Lee".into(),
        phone: "555".into(),
        position: "Eng".into(),
        email: email.into(),
        password: "123456".into(),
    }
}

fn ready_state(users: Vec<User>) -> UiState {
    let mut state = UiState {
        tab: TAB_USERS,
        ..Default::default()
    };
    state.apply_snapshot(PageSnapshot {
        status: PageStatus::Ready,
        users,
        refreshed_at: Some("12:00:00".into()),
    });
    state
}

/// Feed a key through `handle_key` and apply any table action headlessly.
fn press(state: &mut UiState, table: &mut TableController, code: KeyCode) -> Effect {
    match handle_key(state, table, KeyModifiers::NONE, code) {
        Effect::Dispatch(action) => {
            let users = state.users.clone();
            let intent = table.dispatch(action, &users, &mut NoDialogs);
            state.reconcile_focus(table);
            match intent {
                Some(intent) => Effect::Send(UiCommand::from(intent)),
                None => Effect::None,
            }
        }
        other => other,
    }
}

fn screen(state: &UiState, table: &TableController) -> String {
    let mut terminal = Terminal::new(TestBackend::new(120, 16)).unwrap();
    terminal.draw(|f| draw(f.area(), f, state, table)).unwrap();
    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn enter_on_home_opens_user_list() {
    let mut state = UiState::default();
    let mut table = TableController::default();
    assert_eq!(state.tab, TAB_HOME);
    press(&mut state, &mut table, KeyCode::Enter);
    assert_eq!(state.tab, TAB_USERS);
}

#[test]
fn typing_into_a_new_draft_and_saving_raises_create() {
    let mut state = ready_state(vec![user("1", "Ana", "ana@x.com")]);
    let mut table = TableController::default();

    press(&mut state, &mut table, KeyCode::Char('n'));
    assert_eq!(state.focus, Some((DraftSlot::Create, Field::FirstName)));

    for (i, value) in ["Bo", "Kim", "1", "Ops", "bo@x.com"].iter().enumerate() {
        for c in value.chars() {
            press(&mut state, &mut table, KeyCode::Char(c));
        }
        if i < 4 {
            press(&mut state, &mut table, KeyCode::Tab);
        }
    }
    press(&mut state, &mut table, KeyCode::Backspace);
    press(&mut state, &mut table, KeyCode::Char('m'));

    let effect = press(&mut state, &mut table, KeyCode::Enter);

    match effect {
        Effect::Send(UiCommand::Apply(Intent::Create(u))) => {
            assert_eq!(u.first_name, "Bo");
            assert_eq!(u.email, "bo@x.com");
        }
        other => panic!("unexpected effect: {other:?}"),
    }
    assert_eq!(state.focus, None);
}

#[test]
fn letters_go_to_the_draft_not_to_shortcuts() {
    let mut state = ready_state(vec![]);
    let mut table = TableController::default();
    press(&mut state, &mut table, KeyCode::Char('n'));

    let effect = press(&mut state, &mut table, KeyCode::Char('q'));

    assert!(matches!(effect, Effect::None));
    assert_eq!(table.new_draft().unwrap().first_name, "q");
}

#[test]
fn s_is_typed_into_an_open_create_draft() {
    let mut state = ready_state(vec![]);
    let mut table = TableController::default();
    press(&mut state, &mut table, KeyCode::Char('n'));

    let effect = press(&mut state, &mut table, KeyCode::Char('s'));

    assert!(matches!(effect, Effect::None));
    assert_eq!(table.new_draft().unwrap().first_name, "s");
    state.tab = TAB_HELP;
    assert!(!screen(&state, &table).contains("Save new user"));
}

#[test]
fn escape_cancels_the_focused_draft() {
    let mut state = ready_state(vec![user("1", "Ana", "ana@x.com")]);
    let mut table = TableController::default();
    press(&mut state, &mut table, KeyCode::Char('e'));
    assert!(table.edit_draft().is_some());

    press(&mut state, &mut table, KeyCode::Esc);

    assert!(table.edit_draft().is_none());
    assert_eq!(state.focus, None);
}

#[test]
fn edit_draft_for_a_vanished_row_releases_the_keyboard() {
    let mut state = ready_state(vec![user("1", "Ana", "ana@x.com")]);
    let mut table = TableController::default();
    press(&mut state, &mut table, KeyCode::Char('e'));
    press(&mut state, &mut table, KeyCode::Char('r'));
    assert_eq!(table.edit_draft().unwrap().first_name, "Anar");

    apply_event(
        &mut state,
        &mut table,
        PageEvent::Snapshot(PageSnapshot {
            status: PageStatus::Ready,
            users: vec![],
            refreshed_at: None,
        }),
    );

    assert!(table.edit_draft().is_none());
    assert_eq!(state.focus, None);
    assert!(matches!(
        press(&mut state, &mut table, KeyCode::Char('r')),
        Effect::Send(UiCommand::Reload)
    ));
}

#[test]
fn failed_snapshot_closes_open_drafts() {
    let mut state = ready_state(vec![user("1", "Ana", "ana@x.com")]);
    let mut table = TableController::default();
    press(&mut state, &mut table, KeyCode::Char('n'));
    assert!(state.focus.is_some());

    apply_event(
        &mut state,
        &mut table,
        PageEvent::Snapshot(PageSnapshot {
            status: PageStatus::Failed("Failed to fetch users".into()),
            users: vec![user("1", "Ana", "ana@x.com")],
            refreshed_at: None,
        }),
    );

    assert!(table.new_draft().is_none());
    assert_eq!(state.focus, None);
}

#[test]
fn number_keys_sort_and_delete_targets_sorted_selection() {
    let mut state = ready_state(vec![
        user("1", "Cy", "a@x.com"),
        user("2", "Ana", "b@x.com"),
    ]);
    let mut table = TableController::default();

    press(&mut state, &mut table, KeyCode::Char('1'));
    assert_eq!(table.sort_column(), Field::FirstName);

    match handle_key(&mut state, &table, KeyModifiers::NONE, KeyCode::Char('d')) {
        Effect::Dispatch(TableAction::RequestDelete(id)) => assert_eq!(id, "2"),
        other => panic!("unexpected effect: {other:?}"),
    }
}

#[test]
fn shortcuts_are_ignored_until_the_list_is_ready() {
    let mut state = UiState {
        tab: TAB_USERS,
        ..Default::default()
    };
    let table = TableController::default();
    assert!(matches!(
        handle_key(&mut state, &table, KeyModifiers::NONE, KeyCode::Char('n')),
        Effect::None
    ));
    assert!(matches!(
        handle_key(&mut state, &table, KeyModifiers::NONE, KeyCode::Char('r')),
        Effect::Send(UiCommand::Reload)
    ));
    assert!(matches!(
        handle_key(&mut state, &table, KeyModifiers::CONTROL, KeyCode::Char('c')),
        Effect::Quit
    ));
}

#[test]
fn users_tab_renders_loading_and_error_in_place_of_table() {
    let table = TableController::default();
    let mut state = UiState {
        tab: TAB_USERS,
        ..Default::default()
    };
    assert!(screen(&state, &table).contains("Loading..."));

    state.status = PageStatus::Failed("Failed to fetch users".into());
    let text = screen(&state, &table);
    assert!(text.contains("Failed to fetch users"));
    assert!(!text.contains("Actions"));
}

#[test]
fn users_tab_renders_sorted_rows_with_arrow_and_draft_row() {
    let state = ready_state(vec![
        user("1", "Zed", "z@x.com"),
        user("2", "Ana", "a@x.com"),
    ]);
    let mut table = TableController::default();
    table.begin_create();

    let text = screen(&state, &table);

    assert!(text.contains("Email ↑"));
    assert!(text.contains("Actions"));
    assert!(text.contains("[enter] save"));
    let ana = text.find("a@x.com").unwrap();
    let zed = text.find("z@x.com").unwrap();
    assert!(ana < zed);
    assert!(text.contains("refreshed 12:00:00"));
}
