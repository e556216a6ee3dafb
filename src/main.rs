//! # Airwaves - Endless Artist Radio
//!
//! Command-line front end: each `next` invocation picks one track and saves
//! the station state, so a player can call it once per song.
//!
//! ## Usage
//!
//! ```bash
//! # Start a station
//! airwaves next miles-davis --catalog catalog.json
//!
//! # Continue it from the artist that just played
//! airwaves next miles-davis --last-artist john-coltrane --catalog catalog.json
//!
//! # Inspect or forget the saved station
//! airwaves history
//! airwaves reset
//! ```

use airwaves::algorithm::RngSource;
use airwaves::catalog::JsonCatalog;
use airwaves::config::RuntimeConfig;
use airwaves::radio::Radio;
use airwaves::store::{SqliteStore, StateStore, STATE_NAME};
use airwaves::{cli, completion};
use anyhow::Result;
use clap::{CommandFactory, Parser};
use log::{debug, info};
use std::path::PathBuf;

/// Main entry point for Airwaves.
///
/// Initializes logging, parses command-line arguments, and routes commands.
///
/// # Logging
///
/// Initializes environment logger which can be controlled via `RUST_LOG`:
/// - `RUST_LOG=debug airwaves next ...` - Show every selection decision
/// - `RUST_LOG=airwaves::session=trace airwaves next ...` - Cache hits and misses
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    match args.command {
        cli::Command::Next {
            base_artist,
            last_artist,
            user,
            catalog,
            db,
            config,
            seed,
        } => {
            let runtime = RuntimeConfig::resolve(db, config.as_deref())?;
            debug!("Using state database {}", runtime.db_path.display());

            let catalog = JsonCatalog::from_file(&catalog)?;
            let store = SqliteStore::open(&runtime.db_path)?;
            let rng = match seed {
                Some(seed) => RngSource::seeded(seed),
                None => RngSource::from_entropy(),
            };

            let mut radio = Radio::open(catalog, store, rng, runtime.radio)?;
            match radio.next_track(&base_artist, last_artist.as_deref(), user.as_deref())? {
                Some(track) => println!("{track}"),
                None => println!("End of station"),
            }
        }
        cli::Command::History { db } => {
            let store = open_store(db)?;
            let state = store.load(STATE_NAME)?.unwrap_or_default();
            if state.played_tracks.is_empty() {
                println!("No tracks played yet");
            }
            for key in &state.played_tracks {
                println!("{key}");
            }
        }
        cli::Command::Reset { db } => {
            let store = open_store(db)?;
            store.clear(STATE_NAME)?;
            info!("Station state cleared");
            println!("Station reset");
        }
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(&shell), &mut cmd);
        }
        cli::Command::CompletionEnhanced { shell } => {
            print!("{}", completion::enhanced_completion_script(shell)?);
        }
        cli::Command::CompleteArtists { catalog } => {
            // Called by the enhanced completion scripts
            completion::print_artist_completions(&catalog)?;
        }
    }

    Ok(())
}

fn open_store(db: Option<PathBuf>) -> Result<SqliteStore> {
    let runtime = RuntimeConfig::resolve(db, None)?;
    SqliteStore::open(&runtime.db_path)
}
