//! Application-level orchestration.
//!
//! The page controller owns the user list and talks to the backend; the
//! controller loop feeds it commands from presentation layers and reports
//! snapshots back.

mod controller;
mod page;

pub(crate) use controller::{run_controller, UiCommand};
pub(crate) use page::{PageController, FETCH_FAILED};
