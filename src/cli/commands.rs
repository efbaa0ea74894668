use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::Path;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{AddArgs, LoginArgs};
use crate::app::{App, DeleteOutcome};
use crate::auth::{Identity, SessionStore};
use crate::models::{Snippet, SnippetDraft, SnippetId, display_tags};

const DESCRIPTION_WIDTH: usize = 60;

fn margin() -> colored::ColoredString {
    "┃".bright_magenta()
}

/// Lists the snippets matching `term` (all of them when empty).
pub fn list(app: &mut App, term: String) -> Result<()> {
    app.set_search(term);
    let visible = app.visible();

    if visible.is_empty() {
        if app.search_term.is_empty() {
            println!("{}  No snippets yet. Add one with `snipvault add`.", margin());
        } else {
            println!(
                "{}  No snippets match '{}'",
                margin(),
                app.search_term.bright_white()
            );
        }
        return Ok(());
    }

    println!(
        "{}  {} ({})",
        margin(),
        "SNIPPETS".bright_green().bold(),
        visible.len()
    );
    println!("{}", "─".repeat(60).bright_magenta());

    for snippet in visible {
        print_summary(snippet);
    }

    Ok(())
}

fn print_summary(snippet: &Snippet) {
    println!(
        "{}  {}  {}  {}  {}  {}",
        margin(),
        snippet.id.to_string().bright_black(),
        snippet.title.bold(),
        format!("[{}]", snippet.language.display_name()).bright_yellow(),
        display_tags(&snippet.tags).bright_cyan(),
        snippet.created_date().bright_black()
    );

    let description = snippet.description.lines().next().unwrap_or("").trim();
    if !description.is_empty() {
        println!(
            "{}    {}",
            margin(),
            truncate(description, DESCRIPTION_WIDTH).dimmed()
        );
    }
}

/// Cuts `text` to `max` terminal columns, marking the cut with an ellipsis.
fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }

    let mut out = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w + 1 > max {
            break;
        }
        out.push(ch);
        width += w;
    }
    out.push('…');
    out
}

/// Shows the content of a specific snippet by ID
pub fn show(app: &App, id: &str) -> Result<()> {
    let Some(snippet) = app.find(id) else {
        println!("{}  No snippet found with ID: {}", margin(), id);
        return Ok(());
    };

    println!(
        "{}  {} {}",
        margin(),
        "SNIPPET".bright_green().bold(),
        snippet.title.bold()
    );
    println!("{}", "─".repeat(60).bright_magenta());
    println!(
        "{}  {}: {}",
        margin(),
        "Language".bright_yellow(),
        snippet.language.display_name()
    );
    if !snippet.description.is_empty() {
        println!(
            "{}  {}: {}",
            margin(),
            "Description".bright_cyan(),
            snippet.description
        );
    }
    if !snippet.tags.is_empty() {
        println!(
            "{}  {}: {}",
            margin(),
            "Tags".bright_blue(),
            display_tags(&snippet.tags)
        );
    }
    println!(
        "{}  {}: {}",
        margin(),
        "Created".bright_magenta(),
        snippet.created_date()
    );
    println!(
        "{}  {}: {}",
        margin(),
        "Lines".bright_green(),
        snippet.line_count()
    );
    println!("{}  {}: {}", margin(), "ID".bright_black(), snippet.id);
    println!("{}", "─".repeat(60).bright_magenta());

    for line in snippet.code.lines() {
        println!("{}  {}", margin(), line);
    }

    Ok(())
}

pub async fn add(app: &mut App, args: AddArgs) -> Result<()> {
    let code = match (args.code, args.code_file) {
        (Some(code), _) => code,
        (None, Some(path)) => fs::read_to_string(&path)
            .with_context(|| format!("Failed to read code from {}", path.display()))?,
        (None, None) => {
            let mut code = String::new();
            io::stdin()
                .read_to_string(&mut code)
                .context("Failed to read code from stdin")?;
            code
        }
    };

    app.open_form();
    app.draft = SnippetDraft {
        title: args.title,
        description: args.description,
        code,
        tags: args.tags,
        language: args.language,
    };

    let snippet = app.add().await?;
    println!(
        "{}  Saved snippet {} {}",
        margin(),
        snippet.title.bold(),
        format!("({})", snippet.id).bright_black()
    );
    Ok(())
}

pub async fn delete(app: &mut App, id: &str, assume_yes: bool) -> Result<()> {
    let target = app
        .find(id)
        .map(|s| s.id.clone())
        .unwrap_or_else(|| SnippetId::parse(id));

    let outcome = app
        .delete(&target, |snippet| assume_yes || confirm_delete(snippet))
        .await?;

    match outcome {
        DeleteOutcome::Deleted => println!("{}  Deleted snippet {}", margin(), target),
        DeleteOutcome::Cancelled => println!("{}  Delete cancelled", margin()),
        DeleteOutcome::NotFound => {
            println!("{}  No snippet found with ID: {}", margin(), target)
        }
    }
    Ok(())
}

fn confirm_delete(snippet: Option<&Snippet>) -> bool {
    let name = snippet.map(|s| s.title.as_str()).unwrap_or("this snippet");
    print!(
        "{}  Are you sure you want to delete {}? [y/N] ",
        margin(),
        name.bold()
    );
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

pub fn export(app: &App, output: &Path) -> Result<()> {
    let Some(json) = app.export()? else {
        println!("{}  No snippets to export", margin());
        return Ok(());
    };

    fs::write(output, json)
        .with_context(|| format!("Failed to write export file {}", output.display()))?;
    println!(
        "{}  Exported {} snippet(s) to {}",
        margin(),
        app.snippets().len(),
        output.display().to_string().bright_white()
    );
    Ok(())
}

pub async fn import(app: &mut App, path: &Path) -> Result<()> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read import file {}", path.display()))?;

    let report = app.import(&bytes).await?;
    println!(
        "{}  Imported {} snippet(s)",
        margin(),
        report.imported.to_string().bright_green()
    );
    if report.skipped > 0 {
        println!(
            "{}  Skipped {} entr(ies) that were not snippets",
            margin(),
            report.skipped.to_string().yellow()
        );
    }
    Ok(())
}

pub async fn login(app: &mut App, sessions: &SessionStore, args: LoginArgs) -> Result<()> {
    let mut identity = Identity::new(args.provider, args.uid);
    identity.display_name = args.name;
    identity.email = args.email;
    identity.access_token = args.token;

    sessions.save(&identity)?;
    println!(
        "{}  Signed in as {} via {}",
        margin(),
        identity.label().bold(),
        identity.provider
    );

    app.sign_in(identity).await?;
    println!(
        "{}  {} snippet(s) available",
        margin(),
        app.snippets().len()
    );
    Ok(())
}

pub fn logout(sessions: &SessionStore) -> Result<()> {
    if sessions.clear()? {
        println!("{}  Signed out", margin());
    } else {
        println!("{}  Nobody was signed in", margin());
    }
    Ok(())
}

pub fn whoami(sessions: &SessionStore) -> Result<()> {
    match sessions.load()? {
        Some(identity) => println!(
            "{}  {} ({} via {})",
            margin(),
            identity.label().bold(),
            identity.uid,
            identity.provider
        ),
        None => println!("{}  Not signed in", margin()),
    }
    Ok(())
}
