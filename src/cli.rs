//! # Command-Line Interface Module
//!
//! This module defines the command-line interface for Airwaves using Clap derive macros.
//!
//! ## Commands
//!
//! - `next`: Pick the next track of a station
//! - `history`: Show the recently played tracks of the saved station
//! - `reset`: Forget the saved station
//! - `completion`: Generate shell completions
//! - `completion-enhanced`: Shell completions that also complete artist keys
//!
//! ## Examples
//!
//! ```bash
//! airwaves next "miles-davis" --catalog catalog.json
//! airwaves next "miles-davis" --last-artist "john-coltrane" --catalog catalog.json
//! airwaves next "miles-davis" --last-artist "john-coltrane" --user alice --catalog catalog.json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "airwaves")]
#[command(about = "Airwaves: endless artist radio over a music catalog")]
#[command(version)]
pub struct Args {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pick the next track of a station
    ///
    /// Without --last-artist a new station starts: the play history and the
    /// lookup cache are discarded and the base artist plays first. With it,
    /// the station keeps drifting through related artists and now and then
    /// returns to the base artist.
    Next {
        /// Artist key the station is built around
        #[arg(value_hint = clap::ValueHint::Other)]
        base_artist: String,

        /// Artist key of the track that played last
        #[arg(long)]
        last_artist: Option<String>,

        /// Only play artists and tracks from this user's collection
        #[arg(long)]
        user: Option<String>,

        /// Catalog JSON file with artists, relations and collections
        #[arg(long, env = "AIRWAVES_CATALOG", value_hint = clap::ValueHint::FilePath)]
        catalog: PathBuf,

        /// Station state database (defaults to the data directory)
        #[arg(long, env = "AIRWAVES_DB", value_hint = clap::ValueHint::FilePath)]
        db: Option<PathBuf>,

        /// JSON file overriding selection tunables
        #[arg(long, env = "AIRWAVES_CONFIG", value_hint = clap::ValueHint::FilePath)]
        config: Option<PathBuf>,

        /// Seed for reproducible selections
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show the recently played tracks of the saved station, oldest first
    History {
        /// Station state database (defaults to the data directory)
        #[arg(long, env = "AIRWAVES_DB", value_hint = clap::ValueHint::FilePath)]
        db: Option<PathBuf>,
    },

    /// Forget the saved station, history and cache included
    Reset {
        /// Station state database (defaults to the data directory)
        #[arg(long, env = "AIRWAVES_DB", value_hint = clap::ValueHint::FilePath)]
        db: Option<PathBuf>,
    },

    /// Generate shell completions
    ///
    /// Outputs completion script for the specified shell to stdout.
    /// Redirect to appropriate file for your shell's completion system.
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate enhanced shell completions with artist completion
    ///
    /// Like `completion`, but base and last artists complete from the
    /// catalog passed with --catalog or set in AIRWAVES_CATALOG.
    /// Supported shells: bash, fish
    CompletionEnhanced {
        /// Shell to generate enhanced completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Internal command for shell completion (hidden)
    #[command(hide = true)]
    CompleteArtists {
        #[arg(long, env = "AIRWAVES_CATALOG")]
        catalog: PathBuf,
    },
}
