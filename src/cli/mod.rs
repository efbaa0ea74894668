//! CLI Module for snipvault
//! Parses arguments, wires the configured store into an [`App`] and runs one
//! command against it.

pub mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use crate::app::App;
use crate::auth::{AuthProvider, SessionStore};
use crate::config::{Config, StoreMode};
use crate::models::SnippetLanguage;

#[derive(Parser, Debug)]
#[command(name = "snipvault", version, about = "Store, search and share code snippets")]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Where the local collection and session live
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Use the remote store regardless of the configured mode
    #[arg(long, global = true)]
    pub remote: bool,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List snippets, optionally filtered
    #[command(visible_alias = "ls")]
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Search titles, descriptions and tags
    #[command(visible_alias = "find")]
    Search { term: String },
    /// Print one snippet including its code
    Show { id: String },
    /// Add a snippet
    Add(AddArgs),
    /// Delete a snippet after confirmation
    #[command(visible_alias = "rm")]
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Write all snippets to a JSON file
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Add every snippet from a JSON file
    Import { path: PathBuf },
    /// Record the identity returned by a sign-in provider
    Login(LoginArgs),
    /// Forget the signed-in identity
    Logout,
    /// Show who is signed in
    Whoami,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(short, long)]
    pub title: String,

    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Code text; read from stdin when neither this nor --code-file is given
    #[arg(short, long, conflicts_with = "code_file")]
    pub code: Option<String>,

    #[arg(long)]
    pub code_file: Option<PathBuf>,

    /// Comma-separated tags
    #[arg(long, default_value = "")]
    pub tags: String,

    #[arg(short, long, default_value = "javascript")]
    pub language: SnippetLanguage,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub provider: AuthProvider,

    #[arg(long)]
    pub uid: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    /// Access token sent to the remote store
    #[arg(long)]
    pub token: Option<String>,
}

/// Executes the parsed command.
pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    if cli.remote {
        config.mode = StoreMode::Remote;
    }

    let sessions = SessionStore::new(&config.data_dir()?);

    match cli.command {
        Command::Logout => return commands::logout(&sessions),
        Command::Whoami => return commands::whoami(&sessions),
        _ => {}
    }

    let mut app = App::new(config.build_store()?, sessions.load()?);

    match cli.command {
        Command::Login(args) => commands::login(&mut app, &sessions, args).await,
        Command::List { search } => {
            app.start().await?;
            commands::list(&mut app, search.unwrap_or_default())
        }
        Command::Search { term } => {
            app.start().await?;
            commands::list(&mut app, term)
        }
        Command::Show { id } => {
            app.start().await?;
            commands::show(&app, &id)
        }
        Command::Add(args) => {
            app.start().await?;
            commands::add(&mut app, args).await
        }
        Command::Delete { id, yes } => {
            app.start().await?;
            commands::delete(&mut app, &id, yes).await
        }
        Command::Export { output } => {
            app.start().await?;
            let output = output.unwrap_or_else(|| PathBuf::from(&config.export_file));
            commands::export(&app, &output)
        }
        Command::Import { path } => {
            app.start().await?;
            commands::import(&mut app, &path).await
        }
        Command::Logout | Command::Whoami => Ok(()),
    }
}

/// Prints an error with its causes in the tool's margin style.
pub fn report_error(err: &anyhow::Error) {
    eprintln!(
        "{}  {} {}",
        "┃".bright_magenta(),
        "Error:".bright_red().bold(),
        err
    );
    for cause in err.chain().skip(1) {
        eprintln!("{}    caused by: {}", "┃".bright_magenta(), cause);
    }
}
