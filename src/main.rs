use colored::Colorize;
use std::process::exit;
use tracing_subscriber::EnvFilter;

use gitseed::common::error::{CloneError, GENERIC_EXIT_CODE};
use gitseed::presentation::cli::CliApp;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Run the CLI application
    let app = CliApp::new();
    if let Err(error) = app.run().await {
        // The full chain goes to stderr for operators; orchestration reacts
        // to the exit code alone.
        eprintln!("{} {:?}", "Error:".red().bold(), error);
        let exit_code = error
            .downcast_ref::<CloneError>()
            .map(CloneError::exit_code)
            .unwrap_or(GENERIC_EXIT_CODE);
        exit(exit_code);
    }
}
