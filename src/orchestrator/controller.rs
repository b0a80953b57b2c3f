//! Page controller loop.
//!
//! Owns the [`PageController`], loads once on start, then executes commands
//! from presentation layers and pushes a fresh snapshot after each one.

use super::page::PageController;
use crate::api::UserApi;
use crate::model::{PageEvent, PageStatus};
use crate::table::Intent;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Commands emitted by UI layers.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    Reload,
    Apply(Intent),
    Quit,
}

impl From<Intent> for UiCommand {
    fn from(intent: Intent) -> Self {
        UiCommand::Apply(intent)
    }
}

fn publish<A: UserApi + ?Sized>(page: &PageController<A>, event_tx: &UnboundedSender<PageEvent>) {
    let _ = event_tx.send(PageEvent::Snapshot(page.snapshot()));
}

pub(crate) async fn run_controller<A: UserApi + ?Sized>(
    api: Arc<A>,
    event_tx: UnboundedSender<PageEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut page = PageController::new(api);

    publish(&page, &event_tx);
    page.load().await;
    publish(&page, &event_tx);

    while let Some(cmd) = cmd_rx.recv().await {
        tracing::debug!(?cmd, "ui command");
        match cmd {
            UiCommand::Reload => {
                let _ = event_tx.send(PageEvent::Info("Reloading…".into()));
                page.load().await;
            }
            UiCommand::Apply(intent) => page.apply(intent).await,
            UiCommand::Quit => break,
        }
        publish(&page, &event_tx);
        if let PageStatus::Ready = page.status() {
            let _ = event_tx.send(PageEvent::Info(format!(
                "{} user(s) loaded",
                page.users().len()
            )));
        }
    }

    Ok(())
}
