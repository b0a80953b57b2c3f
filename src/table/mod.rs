//! Client-side table state: sorting, the create/edit drafts, and local
//! validation before anything is handed to the page controller.
//!
//! All transitions go through [`TableController::dispatch`]. Alerts and
//! confirmations are delegated to a [`Prompt`] so the controller never talks
//! to a terminal directly.

mod sort;
mod validate;

pub use sort::sorted_view;
pub use validate::ValidationError;

use validate::{validate_edit, validate_new};

use crate::model::{Field, SortColumn, SortDirection, User, DEFAULT_PASSWORD};

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this user?";

/// Blocking user dialogs.
pub trait Prompt {
    fn alert(&mut self, message: &str);
    fn confirm(&mut self, message: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftSlot {
    Create,
    Edit,
}

#[derive(Debug, Clone)]
pub enum TableAction {
    SetSort(SortColumn),
    BeginCreate,
    BeginEdit(User),
    Cancel(DraftSlot),
    Input {
        slot: DraftSlot,
        field: Field,
        value: String,
    },
    SubmitCreate,
    SubmitEdit,
    RequestDelete(String),
}

/// Mutation requests raised for the page controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Create(User),
    Update(User),
    Delete(String),
}

#[derive(Debug, Clone)]
pub struct TableController {
    sort_column: SortColumn,
    sort_direction: SortDirection,
    new_draft: Option<User>,
    edit_draft: Option<User>,
    default_password: String,
}

impl Default for TableController {
    fn default() -> Self {
        Self::new(DEFAULT_PASSWORD)
    }
}

impl TableController {
    pub fn new(default_password: impl Into<String>) -> Self {
        Self {
            sort_column: Field::Email,
            sort_direction: SortDirection::Ascending,
            new_draft: None,
            edit_draft: None,
            default_password: default_password.into(),
        }
    }

    pub fn sort_column(&self) -> SortColumn {
        self.sort_column
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn new_draft(&self) -> Option<&User> {
        self.new_draft.as_ref()
    }

    pub fn edit_draft(&self) -> Option<&User> {
        self.edit_draft.as_ref()
    }

    pub fn draft(&self, slot: DraftSlot) -> Option<&User> {
        match slot {
            DraftSlot::Create => self.new_draft.as_ref(),
            DraftSlot::Edit => self.edit_draft.as_ref(),
        }
    }

    /// True when `user` is the row currently open for editing.
    pub fn is_editing(&self, user: &User) -> bool {
        self.edit_draft
            .as_ref()
            .is_some_and(|d| d.id.is_some() && d.id == user.id)
    }

    pub fn sorted<'a>(&self, users: &'a [User]) -> Vec<&'a User> {
        sorted_view(users, self.sort_column, self.sort_direction)
    }

    /// Apply one action. `records` is the current server-side list, used for
    /// duplicate-email checks.
    pub fn dispatch(
        &mut self,
        action: TableAction,
        records: &[User],
        prompt: &mut dyn Prompt,
    ) -> Option<Intent> {
        match action {
            TableAction::SetSort(column) => {
                self.toggle_sort(column);
                None
            }
            TableAction::BeginCreate => {
                self.begin_create();
                None
            }
            TableAction::BeginEdit(user) => {
                self.begin_edit(user);
                None
            }
            TableAction::Cancel(slot) => {
                self.cancel(slot);
                None
            }
            TableAction::Input { slot, field, value } => {
                self.set_field(slot, field, value);
                None
            }
            TableAction::SubmitCreate => self.submit_create(records, prompt),
            TableAction::SubmitEdit => self.submit_edit(records, prompt),
            TableAction::RequestDelete(id) => self.request_delete(id, prompt),
        }
    }

    pub fn toggle_sort(&mut self, column: SortColumn) {
        if self.sort_column == column {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_column = column;
            self.sort_direction = SortDirection::Ascending;
        }
    }

    /// Always starts from a blank draft, replacing any half-typed one.
    pub fn begin_create(&mut self) {
        self.new_draft = Some(User::draft(&self.default_password));
    }

    pub fn begin_edit(&mut self, user: User) {
        self.edit_draft = Some(user);
    }

    pub fn cancel(&mut self, slot: DraftSlot) {
        match slot {
            DraftSlot::Create => self.new_draft = None,
            DraftSlot::Edit => self.edit_draft = None,
        }
    }

    /// Close drafts the current page can no longer show. Nothing is shown
    /// unless the list is ready, and an edit draft needs its row to exist.
    pub fn drop_stale_drafts(&mut self, records: &[User], ready: bool) {
        if !ready {
            self.new_draft = None;
            self.edit_draft = None;
            return;
        }
        if !records.iter().any(|u| self.is_editing(u)) {
            self.edit_draft = None;
        }
    }

    pub fn set_field(&mut self, slot: DraftSlot, field: Field, value: String) {
        let draft = match slot {
            DraftSlot::Create => self.new_draft.as_mut(),
            DraftSlot::Edit => self.edit_draft.as_mut(),
        };
        if let Some(draft) = draft {
            *draft.field_mut(field) = value;
        }
    }

    pub fn submit_create(&mut self, records: &[User], prompt: &mut dyn Prompt) -> Option<Intent> {
        let draft = self.new_draft.as_ref()?;
        match validate_new(draft, records) {
            Ok(()) => self.new_draft.take().map(Intent::Create),
            Err(e) => {
                tracing::debug!(error = %e, "create draft rejected");
                // Missing fields throw the draft away; other failures keep it for correction.
                if e == ValidationError::MissingFields {
                    self.new_draft = None;
                }
                prompt.alert(&e.to_string());
                None
            }
        }
    }

    pub fn submit_edit(&mut self, records: &[User], prompt: &mut dyn Prompt) -> Option<Intent> {
        let draft = self.edit_draft.as_ref()?;
        match validate_edit(draft, records) {
            Ok(()) => self.edit_draft.take().map(Intent::Update),
            Err(e) => {
                tracing::debug!(error = %e, id = ?draft.id, "edit draft rejected");
                prompt.alert(&e.to_string());
                None
            }
        }
    }

    pub fn request_delete(&mut self, id: String, prompt: &mut dyn Prompt) -> Option<Intent> {
        if prompt.confirm(DELETE_CONFIRMATION) {
            Some(Intent::Delete(id))
        } else {
            None
        }
    }
}

#[cfg(test)]
#[path = "../tests/table_tests.rs"]
mod tests;
