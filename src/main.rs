//! Blade CLI entry point
//!
//! Parses arguments, installs logging and runs the selected command. Errors
//! are printed with [`user_friendly_error`] and exit with status 1.

use anyhow::Result;
use blade_cli::cli;
use blade_cli::core::user_friendly_error;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.log_filter());

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
