//! `marknote` command-line client.
//!
//! Drives the note store against the remote API:
//!
//! ```bash
//! marknote list
//! marknote tags
//! marknote show 64f1c2
//! marknote create "Groceries"
//! marknote edit 64f1c2 --tags "home;todo" --check "milk"
//! marknote delete 64f1c2
//! ```

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marknote_client::HttpNoteGateway;
use marknote_core::{group_by_tag, untagged, Note, NoteGateway, Snippet};
use marknote_editor::{LastOpened, NoteStore};

#[derive(Parser)]
#[command(name = "marknote", about = "Markdown notes from the command line", version)]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all notes
    List,
    /// List notes grouped by tag
    Tags,
    /// Show a note (defaults to the last opened one)
    Show { note_id: Option<String> },
    /// Create a note and open it
    Create { title: String },
    /// Edit a note and save it
    Edit {
        note_id: String,
        #[arg(long)]
        title: Option<String>,
        /// Replace the whole content
        #[arg(long)]
        content: Option<String>,
        /// Tags as a `;`-separated list
        #[arg(long)]
        tags: Option<String>,
        /// Append an open checklist item
        #[arg(long)]
        check: Option<String>,
    },
    /// Delete a note
    Delete { note_id: String },
}

fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   RUST_LOG    - standard env filter (default: "marknote=warn")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "marknote=warn,marknote_editor=warn,marknote_client=warn".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(ref path) = log_file {
        let path = std::path::Path::new(path);
        let file_dir = path.parent().unwrap_or(std::path::Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("marknote.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
                .init();
        }
        Some(guard)
    } else {
        // Keep stdout for command output.
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
        None
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = init_tracing();
    let cli = Cli::parse();

    let gateway = Arc::new(HttpNoteGateway::from_env().context("invalid API configuration")?);
    info!(base_url = %gateway.config().base_url, "marknote starting");

    let mut store = NoteStore::new(gateway);
    match LastOpened::from_env() {
        Ok(slot) => store = store.with_last_opened(slot),
        Err(e) => tracing::warn!(error = %e, "Last opened note will not be remembered"),
    }

    run(&store, cli.command, cli.json).await
}

async fn run<G: NoteGateway>(
    store: &NoteStore<G>,
    command: Command,
    json: bool,
) -> anyhow::Result<()> {
    match command {
        Command::List => {
            store.load_summaries().await;
            let summaries = store.summaries();
            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                for s in &summaries {
                    println!(
                        "{}\t{}\t[{}]\t{}",
                        s.note_id,
                        s.allowance,
                        s.tags.join(", "),
                        s.title
                    );
                }
            }
        }
        Command::Tags => {
            store.load_summaries().await;
            let summaries = store.summaries();
            for group in group_by_tag(&summaries) {
                println!("{} ({})", group.tag, group.notes.len());
                for note in group.notes {
                    println!("  {}\t{}", note.note_id, note.title);
                }
            }
            let rest = untagged(&summaries);
            if !rest.is_empty() {
                println!("(untagged) ({})", rest.len());
                for note in rest {
                    println!("  {}\t{}", note.note_id, note.title);
                }
            }
        }
        Command::Show { note_id } => {
            let note = match note_id {
                Some(id) => store.open_by_id(&id).await?,
                None => match store.restore_last_opened().await? {
                    Some(note) => note,
                    None => bail!("no note id given and no last opened note"),
                },
            };
            print_note(&note, json)?;
        }
        Command::Create { title } => {
            let note = store.create(&title).await?;
            if json {
                print_note(&note, true)?;
            } else {
                println!("{}", note.note_id);
            }
        }
        Command::Edit {
            note_id,
            title,
            content,
            tags,
            check,
        } => {
            store.open_by_id(&note_id).await?;
            if let Some(title) = title {
                store.edit_title(title)?;
            }
            if let Some(content) = content {
                store.edit_content(content)?;
            }
            if let Some(tags) = tags {
                store.edit_tags_input(&tags)?;
            }
            if let Some(item) = check {
                let mut text = store
                    .open_note()
                    .map(|n| n.body.content)
                    .unwrap_or_default();
                if !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
                let end = text.chars().count();
                let splice = Snippet::Checkbox.apply(&text, end);
                store.edit_content(format!("{}{}", splice.text, item))?;
            }

            if !store.snapshot().session.is_some_and(|s| s.is_dirty()) {
                println!("nothing to save");
                return Ok(());
            }
            match store.save().await? {
                Some(saved) => print_note(&saved, json)?,
                None => bail!("note {} was closed before saving", note_id),
            }
        }
        Command::Delete { note_id } => {
            store.load_summaries().await;
            store.remove(&note_id).await?;
            println!("deleted {}", note_id);
        }
    }
    Ok(())
}

fn print_note(note: &Note, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(note)?);
        return Ok(());
    }
    println!("# {}", note.body.title);
    println!(
        "id: {}  owner: {}  allowance: {}",
        note.note_id, note.body.owner_id, note.allowance
    );
    if !note.body.tags.is_empty() {
        println!("tags: {}", note.body.tags.join("; "));
    }
    println!();
    println!("{}", note.body.content);
    Ok(())
}
