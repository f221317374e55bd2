use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use config::{AppConfig, ConfigStore};
use core_orchestrator::Session;
use core_search::MatcherKind;
use core_store::MutationOutcome;
use core_types::{Note, NoteDraft, NoteEdit, NoteId};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pinboard", version, about = "Pinned, tagged notes with regex search")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List notes, pinned first
    List {
        /// Case-insensitive regular expression matched against note text
        #[arg(short, long, default_value = "")]
        search: String,
        /// Only show notes carrying any of these tags
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    /// Create a note
    Add {
        #[arg(required = true)]
        text: Vec<String>,
        /// Space separated tags
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// Replace the text and/or tags of a note
    Edit {
        id: NoteId,
        #[arg(long)]
        text: Option<String>,
        /// Space separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Delete a note
    Delete { id: NoteId },
    /// Toggle the pinned flag of a note
    Pin { id: NoteId },
    /// List tags with the number of notes carrying them
    Tags,
    /// Show the data directory
    Path,
}

/// Subcommands that go through a note session.
enum SessionCommand {
    List { search: String, tags: Vec<String> },
    Add { text: Vec<String>, tags: String },
    Edit { id: NoteId, text: Option<String>, tags: Option<String> },
    Delete { id: NoteId },
    Pin { id: NoteId },
    Tags,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let data_dir = config::data_dir()?;
    let command = match cli.command {
        Command::Path => {
            println!("{}", data_dir.display());
            return Ok(());
        }
        Command::List { search, tags } => SessionCommand::List { search, tags },
        Command::Add { text, tags } => SessionCommand::Add { text, tags },
        Command::Edit { id, text, tags } => SessionCommand::Edit { id, text, tags },
        Command::Delete { id } => SessionCommand::Delete { id },
        Command::Pin { id } => SessionCommand::Pin { id },
        Command::Tags => SessionCommand::Tags,
    };

    fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to prepare data dir {}", data_dir.display()))?;

    let config_store = ConfigStore::from_data_dir(&data_dir);
    let (config, config_err) = match config_store.load_or_init() {
        Ok(cfg) => (cfg, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    let _log_guard = init_local_logger(&data_dir.join("logs"), &config.log_filter);
    if let Some(err) = config_err {
        error!("failed to load config: {err:#}");
    }

    let runtime = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
    runtime.block_on(execute(command, &config, &data_dir))
}

async fn execute(command: SessionCommand, config: &AppConfig, data_dir: &Path) -> Result<()> {
    let gateway = storage_local::open_gateway(&config.storage, data_dir).await?;
    let mut session = Session::start(gateway).await?;

    match command {
        SessionCommand::List { search, tags } => {
            if session.set_search(search) == MatcherKind::Literal {
                eprintln!(
                    "Search pattern is not a valid regular expression; matching it as plain text."
                );
            }
            for tag in tags {
                session.add_tag_filter(tag);
            }
            let visible = session.visible();
            if visible.is_empty() {
                println!("No notes.");
            }
            for note in visible {
                println!("{}", format_line(note));
            }
        }
        SessionCommand::Add { text, tags } => {
            let id = session.create(NoteDraft::new(text.join(" "), tags)).await?;
            info!(id, "note added from cli");
            println!("Created note {id}");
        }
        SessionCommand::Edit { id, text, tags } => {
            let edit = NoteEdit { text, tags };
            if edit.is_empty() {
                bail!("Provide --text and/or --tags to edit note {id}");
            }
            require_found(session.edit(id, edit).await?, id)?;
            println!("Updated note {id}");
        }
        SessionCommand::Delete { id } => {
            require_found(session.delete(id).await?, id)?;
            println!("Deleted note {id}");
        }
        SessionCommand::Pin { id } => {
            require_found(session.toggle_pin(id).await?, id)?;
            let pinned = session.get(id).is_some_and(|note| note.pinned);
            println!("{} note {id}", if pinned { "Pinned" } else { "Unpinned" });
        }
        SessionCommand::Tags => {
            let summary = session.tag_summary();
            if summary.is_empty() {
                println!("No tags.");
            }
            for entry in summary {
                println!("{} {}", entry.tag, entry.count);
            }
        }
    }
    Ok(())
}

fn require_found(outcome: MutationOutcome, id: NoteId) -> Result<()> {
    match outcome {
        MutationOutcome::Applied => Ok(()),
        MutationOutcome::NotFound => bail!("Note {id} not found"),
    }
}

fn format_line(note: &Note) -> String {
    let marker = if note.pinned { '*' } else { '-' };
    let tags = note.tag_list();
    if tags.is_empty() {
        format!("{marker} {} {}", note.id, note.text)
    } else {
        format!("{marker} {} {} [{}]", note.id, note.text, tags.join(" "))
    }
}

fn init_local_logger(
    log_dir: &Path,
    fallback_filter: &str,
) -> tracing_appender::non_blocking::WorkerGuard {
    if let Err(err) = fs::create_dir_all(log_dir) {
        eprintln!("failed to create log dir `{}`: {err}", log_dir.display());
    }
    let file_appender = tracing_appender::rolling::daily(log_dir, "pinboard.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback_filter))
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_writer(writer)
        .init();

    guard
}
