use crate::api::HttpUserApi;
use crate::model::{ClientConfig, Field, PageStatus, SortDirection, DEFAULT_PASSWORD};
use crate::orchestrator::{PageController, FETCH_FAILED};
use crate::table::sorted_view;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Spawn a blocking stdout writer to avoid blocking async tasks.
fn spawn_output_writer() -> (mpsc::UnboundedSender<String>, tokio::task::JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let mut out = std::io::LineWriter::new(stdout.lock());

        while let Some(line) = rx.blocking_recv() {
            let _ = writeln!(out, "{}", line);
        }

        let _ = out.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "user-admin",
    version,
    about = "Manage the user list of a REST backend from the terminal"
)]
pub struct Cli {
    /// Base URL of the backend serving /users
    #[arg(long, default_value = "http://localhost:5000")]
    pub base_url: String,

    /// Print the user list as JSON and exit (no TUI)
    #[arg(long, conflicts_with = "text")]
    pub json: bool,

    /// Print the user list as a text table and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Column to sort the printed list by
    #[arg(long, value_enum, default_value = "email")]
    pub sort: Field,

    /// Sort the printed list in descending order
    #[arg(long)]
    pub desc: bool,

    /// Password given to newly drafted users
    #[arg(long, default_value = DEFAULT_PASSWORD)]
    pub default_password: String,

    /// Per-request timeout (e.g. 5s, 500ms); unbounded when omitted
    #[arg(long)]
    pub timeout: Option<humantime::Duration>,

    /// Log file used while the TUI owns the terminal
    #[arg(long)]
    pub log_file: Option<std::path::PathBuf>,
}

impl Cli {
    pub fn is_interactive(&self) -> bool {
        !self.json && !self.text
    }
}

pub async fn run(args: Cli) -> Result<()> {
    if args.is_interactive() {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            return run_listing(args).await;
        }
    }

    run_listing(args).await
}

/// Build a `ClientConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> ClientConfig {
    ClientConfig {
        base_url: args.base_url.clone(),
        default_password: args.default_password.clone(),
        timeout: args.timeout.map(std::time::Duration::from),
        user_agent: format!("user-admin/{}", env!("CARGO_PKG_VERSION")),
    }
}

/// Fetch once and render the sorted list as output lines.
async fn listing_lines(args: &Cli) -> Result<Vec<String>> {
    let cfg = build_config(args);
    let api = Arc::new(HttpUserApi::new(&cfg).context("invalid backend configuration")?);
    let mut page = PageController::new(api);
    page.load().await;
    if let PageStatus::Failed(_) = page.status() {
        anyhow::bail!("{FETCH_FAILED} from {}", cfg.base_url);
    }

    let direction = if args.desc {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    let sorted = sorted_view(page.users(), args.sort, direction);

    if args.json {
        Ok(vec![serde_json::to_string_pretty(&sorted)?])
    } else {
        Ok(crate::text_table::build_text_table(&sorted, args.sort, direction).lines)
    }
}

/// Fetch once and print the list in the requested format.
async fn run_listing(args: Cli) -> Result<()> {
    let lines = listing_lines(&args).await?;

    let (out_tx, out_handle) = spawn_output_writer();
    for line in lines {
        let _ = out_tx.send(line);
    }
    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
