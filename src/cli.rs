//! CLI interface for Journee.
//!
//! `new`, `list`, `show` and `delete` are one-shot commands. `edit` opens an
//! interactive session that reads one command per line from stdin, with
//! undo/redo and autosave running underneath.
//!
//! Itineraries are addressed by full UUID or an unambiguous prefix.

mod format;
mod repl;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use jiff::Timestamp;
use jiff::civil::Date;
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use crate::autosave::{AutoSave, Persist};
use crate::config::Config;
use crate::model::{Itinerary, Snapshot};
use crate::session::EditorSession;
use crate::storage::Storage;

use repl::Flow;

/// Journee: plan trips one day at a time.
#[derive(Debug, Parser)]
#[command(name = "journee", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new itinerary. Prints its ID.
    New {
        /// Title of the trip.
        title: String,

        /// Where the trip goes.
        #[arg(long)]
        destination: Option<String>,

        /// First day of the trip (YYYY-MM-DD).
        #[arg(long)]
        start: Option<Date>,
    },

    /// List itineraries, most recently updated first.
    List,

    /// Print an itinerary day by day.
    Show {
        /// Itinerary ID or prefix.
        itinerary: String,
    },

    /// Delete an itinerary.
    Delete {
        /// Itinerary ID or prefix.
        itinerary: String,
    },

    /// Edit an itinerary interactively. Type `help` once inside.
    Edit {
        /// Itinerary ID or prefix.
        itinerary: String,
    },
}

/// Run the CLI, returning an error message on failure.
pub async fn run(config: &Config, storage: &Storage) -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::New {
            title,
            destination,
            start,
        } => cmd_new(storage, &title, destination, start),
        Command::List => cmd_list(storage),
        Command::Show { itinerary } => {
            let itinerary = resolve_itinerary(storage, &itinerary)?;
            print!("{}", format::itinerary(&itinerary));
            Ok(())
        }
        Command::Delete { itinerary } => {
            let itinerary = resolve_itinerary(storage, &itinerary)?;
            storage
                .delete_itinerary(itinerary.id)
                .map_err(|e| format!("failed to delete itinerary: {e}"))?;
            eprintln!("Deleted {} ({})", itinerary.title, format::short_id(itinerary.id));
            Ok(())
        }
        Command::Edit { itinerary } => {
            let itinerary = resolve_itinerary(storage, &itinerary)?;
            cmd_edit(config, storage, itinerary).await
        }
    }
}

fn cmd_new(
    storage: &Storage,
    title: &str,
    destination: Option<String>,
    start: Option<Date>,
) -> Result<(), String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("title cannot be empty".to_string());
    }

    let mut itinerary = Itinerary::new(title, Timestamp::now());
    itinerary.destination = destination;
    itinerary.start_date = start;

    storage
        .save_itinerary(&itinerary)
        .map_err(|e| format!("failed to create itinerary: {e}"))?;

    println!("{}", itinerary.id);
    Ok(())
}

fn cmd_list(storage: &Storage) -> Result<(), String> {
    let itineraries = storage
        .list_itineraries()
        .map_err(|e| format!("failed to list itineraries: {e}"))?;

    if itineraries.is_empty() {
        println!("No itineraries");
        return Ok(());
    }

    for it in &itineraries {
        println!("{}", format::summary_line(it));
    }

    Ok(())
}

async fn cmd_edit(config: &Config, storage: &Storage, itinerary: Itinerary) -> Result<(), String> {
    let persist: Arc<dyn Persist<Snapshot>> = Arc::new(storage.clone());
    let autosave = AutoSave::spawn(persist, config.autosave());
    let mut session = EditorSession::open(itinerary, autosave, config.history_limit);

    if let Some(current) = session.current() {
        eprintln!(
            "Editing {} ({}). Type `help` for commands.",
            current.title,
            format::short_id(current.id)
        );
    }

    // Failed autosaves are reported as they happen, without interrupting
    // input. The task ends when the session closes.
    let mut status = session.subscribe();
    let notifier = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            if let (false, Some(error)) = (current.is_saving, current.last_error) {
                eprintln!("autosave failed: {error}");
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut read_error = None;
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                read_error = Some(format!("failed to read input: {e}"));
                break;
            }
        };
        match repl::parse(&line) {
            Ok(None) => {}
            Ok(Some(input)) => {
                if repl::execute(&mut session, input) == Flow::Quit {
                    break;
                }
            }
            Err(e) => eprintln!("{e}"),
        }
    }

    // Write the final state directly: the autosave driver is gone, and a
    // pending debounce would otherwise be lost.
    let last = session.close().await;
    // The driver is gone, so the status channel has closed.
    let _ = notifier.await;

    if let Some(last) = last {
        storage
            .save_itinerary(&last)
            .map_err(|e| format!("failed to save itinerary: {e}"))?;
        eprintln!("Saved {}", last.title);
    }

    read_error.map_or(Ok(()), Err)
}

/// Resolve an itinerary reference (full UUID or unambiguous prefix).
fn resolve_itinerary(storage: &Storage, reference: &str) -> Result<Itinerary, String> {
    // Try full UUID first.
    if let Ok(id) = reference.parse::<Uuid>() {
        return storage
            .load_itinerary(id)
            .map_err(|e| format!("itinerary not found: {e}"));
    }

    let itineraries = storage
        .list_itineraries()
        .map_err(|e| format!("failed to list itineraries: {e}"))?;

    let mut matches: Vec<Itinerary> = itineraries
        .into_iter()
        .filter(|it| it.id.to_string().starts_with(reference))
        .collect();

    match matches.len() {
        0 => Err(format!("no itinerary matching '{reference}'")),
        1 => Ok(matches.remove(0)),
        n => {
            let ids: Vec<String> = matches.iter().map(|it| format::short_id(it.id)).collect();
            Err(format!(
                "'{reference}' is ambiguous: matches {n} itineraries: {}",
                ids.join(", ")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn test_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(dir.path().join("journee.sqlite")).unwrap();
        (dir, storage)
    }

    fn stored(storage: &Storage, title: &str) -> Itinerary {
        let it = Itinerary::new(title, Timestamp::now());
        storage.save_itinerary(&it).unwrap();
        it
    }

    #[test]
    fn resolve_by_full_id_and_prefix() {
        let (_dir, storage) = test_storage();
        let it = stored(&storage, "Hanoi");

        let full = resolve_itinerary(&storage, &it.id.to_string()).unwrap();
        assert_eq!(full.id, it.id);

        let prefix = &it.id.to_string()[..8];
        assert_eq!(resolve_itinerary(&storage, prefix).unwrap().id, it.id);
    }

    #[test]
    fn resolve_unknown_prefix_fails() {
        let (_dir, storage) = test_storage();
        stored(&storage, "Hanoi");

        let err = resolve_itinerary(&storage, "zzz").unwrap_err();
        assert!(err.contains("no itinerary matching"));
    }

    #[test]
    fn resolve_empty_prefix_is_ambiguous_with_two() {
        let (_dir, storage) = test_storage();
        stored(&storage, "Hanoi");
        stored(&storage, "Hue");

        let err = resolve_itinerary(&storage, "").unwrap_err();
        assert!(err.contains("ambiguous"));
    }

    #[test]
    fn new_rejects_blank_title() {
        let (_dir, storage) = test_storage();
        assert!(cmd_new(&storage, "  ", None, None).is_err());
        assert!(storage.list_itineraries().unwrap().is_empty());
    }
}
