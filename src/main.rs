// tagshelf - command line host for the score library core
// Lists playlists/items and edits playlist membership straight against calibre's metadata.db

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tagshelf::{library::COLUMNS, BrowserState, Config, MusicLibrary};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tagshelf")]
#[command(about = "Tag-based playlists over a calibre sheet-music library")]
struct Args {
    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable developer logging (stderr + debug output)
    #[arg(long)]
    dev: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List playlists ("All items" first)
    Playlists,
    /// List the filter predicates discovered from the most used tags
    Filters,
    /// List items, optionally inside a playlist and narrowed by filters
    Items {
        #[arg(long)]
        playlist: Option<String>,
        /// Require this filter tag (repeatable)
        #[arg(long = "filter")]
        filters: Vec<String>,
        /// Enable every filter predicate
        #[arg(long, conflicts_with = "filters")]
        all_filters: bool,
        /// Live search text applied to the listed rows
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Add an item to an existing playlist under a new ordinal
    Add {
        #[arg(long)]
        item: i64,
        #[arg(long)]
        playlist: String,
    },
    /// Remove an item from a playlist
    Remove {
        #[arg(long)]
        item: i64,
        #[arg(long)]
        playlist: String,
    },
    /// Start a new playlist holding one item
    Create {
        #[arg(long)]
        item: i64,
        #[arg(long)]
        playlist: String,
    },
    /// Delete playlist tags no item links to
    Sweep,
    /// Print the effective configuration
    Config,
}

fn init_logging(dev: bool) -> Result<WorkerGuard> {
    // Create logs directory in project root
    let log_dir = PathBuf::from("logs");
    std::fs::create_dir_all(&log_dir)?;

    // Daily rotating file appender
    let file_appender = tracing_appender::rolling::daily(&log_dir, "tagshelf.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let base_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tagshelf=debug"));

    let builder = tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(base_filter);

    // Dev mode mirrors everything to stderr as well as the file
    if dev {
        let subscriber = builder
            .with_writer(file_writer.and(std::io::stderr))
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = builder.with_writer(file_writer).finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(guard)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logging(args.dev)?;

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    info!("tagshelf starting with store {}", config.database_path().display());

    let library = MusicLibrary::new(config);

    match args.command {
        Command::Playlists => {
            let mut state = library.open()?;
            library.reload_playlists(&mut state)?;
            for (index, label) in state.catalog.labels().iter().enumerate() {
                println!("{:>3}  {}", index, label);
            }
        }
        Command::Filters => {
            let state = library.open()?;
            for predicate in state.selection.filters.predicates() {
                println!("{:>5}  {}", predicate.count, predicate.name);
            }
        }
        Command::Items {
            playlist,
            filters,
            all_filters,
            search,
            json,
        } => {
            let state = list_items(
                &library,
                playlist.as_deref(),
                &filters,
                all_filters,
                search.as_deref(),
            )?;
            print_items(&state, json)?;
        }
        Command::Add { item, playlist } => {
            match library.editor().add_to_playlist(item, &playlist)? {
                Some(tag) => println!("Added item {} as {}", item, tag.name),
                None => println!("No playlist '{}' yet - use create", playlist),
            }
        }
        Command::Remove { item, playlist } => {
            match library.editor().remove_from_playlist(item, &playlist)? {
                Some(removal) if removal.tag_deleted => {
                    println!("Removed item {} from {} (tag deleted)", item, removal.tag.name)
                }
                Some(removal) => println!("Removed item {} from {}", item, removal.tag.name),
                None => println!("Item {} is not in '{}'", item, playlist),
            }
        }
        Command::Create { item, playlist } => {
            match library.editor().create_playlist(item, &playlist)? {
                Some(tag) => println!("Created {} with item {}", tag.name, item),
                None => println!("Playlist '{}' already exists, nothing changed", playlist),
            }
        }
        Command::Sweep => {
            let swept = library.editor().sweep_orphans()?;
            for tag in &swept {
                println!("Deleted {}", tag.name);
            }
            println!("{} orphaned playlist tags removed", swept.len());
        }
        Command::Config => {
            print!("{}", toml::to_string_pretty(library.config())?);
        }
    }

    Ok(())
}

fn list_items(
    library: &MusicLibrary,
    playlist: Option<&str>,
    filters: &[String],
    all_filters: bool,
    search: Option<&str>,
) -> Result<BrowserState> {
    let mut state = library.open()?;
    library.reload_playlists(&mut state)?;

    if all_filters {
        state.selection.filters.set_all(true);
    }
    for name in filters {
        if !state.selection.filters.toggle_by_name(name, true) {
            warn!("'{}' is not one of the filter tags, ignoring", name);
            eprintln!("'{}' is not a filter tag (see `tagshelf filters`)", name);
        }
    }

    let index = match playlist {
        Some(label) => {
            let found = state.catalog.labels().iter().position(|l| *l == label);
            if found.is_none() {
                eprintln!("No playlist '{}', listing all items", label);
            }
            found.unwrap_or(0)
        }
        None => 0,
    };
    library
        .change_list(&mut state, index)
        .context("loading items")?;

    if let Some(text) = search {
        library.search(&mut state, text);
    }
    Ok(state)
}

fn print_items(state: &BrowserState, json: bool) -> Result<()> {
    if json {
        let rows: Vec<_> = state.table.visible_rows().map(|(_, item)| item).collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let header: Vec<&str> = COLUMNS
        .iter()
        .filter(|c| !c.hidden)
        .map(|c| c.name)
        .collect();
    println!("{}", header.join(" | "));
    for (_, item) in state.table.visible_rows() {
        let position = item
            .playlist_ordinal
            .map(|o| format!("{:02}. ", o))
            .unwrap_or_default();
        println!(
            "{}{} | {} | {} | {}",
            position, item.title, item.collection, item.author, item.tags
        );
    }
    Ok(())
}
