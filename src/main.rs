//! snipvault - code snippet manager
//!
//! Keeps short code snippets either in a local JSON slot or in a hosted
//! document store, and lets you search, share, export and import them from
//! the terminal.

use clap::Parser;
use color_eyre::Result;
use env_logger::{Builder, Env};
use snipvault::cli::{self, Cli};

fn init_logger(verbose: bool) {
    // RUST_LOG wins; otherwise warnings only, or debug with --verbose.
    let default = if verbose { "debug" } else { "warn" };
    Builder::from_env(Env::default().default_filter_or(default))
        .format_timestamp_millis()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = cli::run(cli).await {
        cli::report_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
