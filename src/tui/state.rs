use crate::model::{Field, PageSnapshot, PageStatus, User};
use crate::table::{DraftSlot, TableController};

pub const TAB_HOME: usize = 0;
pub const TAB_USERS: usize = 1;
pub const TAB_HELP: usize = 2;
pub const TAB_COUNT: usize = 3;

pub struct UiState {
    pub tab: usize,
    pub info: String,

    pub status: PageStatus,
    pub users: Vec<User>,
    pub refreshed_at: Option<String>,

    pub selected: usize, // Index into the sorted view
    pub focus: Option<(DraftSlot, Field)>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tab: TAB_HOME,
            info: String::new(),
            status: PageStatus::Loading,
            users: Vec::new(),
            refreshed_at: None,
            selected: 0,
            focus: None,
        }
    }
}

impl UiState {
    pub fn apply_snapshot(&mut self, snapshot: PageSnapshot) {
        self.status = snapshot.status;
        self.users = snapshot.users;
        if snapshot.refreshed_at.is_some() {
            self.refreshed_at = snapshot.refreshed_at;
        }
        self.clamp_selection();
    }

    pub fn clamp_selection(&mut self) {
        if self.users.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.users.len() {
            self.selected = self.users.len() - 1;
        }
    }

    /// User under the cursor, in the table's current sort order.
    pub fn selected_user<'a>(&'a self, table: &TableController) -> Option<&'a User> {
        table.sorted(&self.users).get(self.selected).copied()
    }

    /// Keep focus on an open draft after the table changed underneath it.
    pub fn reconcile_focus(&mut self, table: &TableController) {
        if let Some((slot, _)) = self.focus {
            if table.draft(slot).is_some() {
                return;
            }
        }
        self.focus = [DraftSlot::Create, DraftSlot::Edit]
            .into_iter()
            .find(|slot| table.draft(*slot).is_some())
            .map(|slot| (slot, Field::FirstName));
    }
}
