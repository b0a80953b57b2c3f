mod api;
mod cli;
mod logging;
mod model;
mod orchestrator;
mod table;
mod text_table;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let is_non_tui = !args.is_interactive();

    let uses_tui = !is_non_tui && cfg!(feature = "tui");
    let _log_guard = logging::init(uses_tui, args.log_file.clone())?;

    match cli::run(args).await {
        Ok(()) => {
            // Explicitly exit with code 0 on success for non-TUI modes
            if is_non_tui {
                std::process::exit(0);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "user-admin failed");
            Err(e)
        }
    }
}
