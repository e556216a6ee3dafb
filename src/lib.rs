//! Endless artist radio over a music catalog.
//!
//! A station is seeded by one artist. Each request for the next track walks
//! the related-artist graph from the artist that played last, now and then
//! returning to the seed, while never repeating a recently played track.
//!
//! Core modules:
//! - [`radio`] - Per-track orchestration and constraint relaxation
//! - [`algorithm`] - Artist and track selection
//! - [`session`] - Station state and lookup cache
//! - [`catalog`] - Catalog provider abstraction and a JSON-backed catalog
//!
//! ### Supporting Modules
//!
//! - [`state`] - Persisted station state
//! - [`store`] - State persistence (SQLite and in-memory)
//! - [`config`] - Tunables and data directory management
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use airwaves::algorithm::RngSource;
//! use airwaves::catalog::JsonCatalog;
//! use airwaves::config::RadioConfig;
//! use airwaves::radio::Radio;
//! use airwaves::store::SqliteStore;
//! use std::path::Path;
//!
//! let catalog = JsonCatalog::from_file(Path::new("catalog.json"))?;
//! let store = SqliteStore::open(&airwaves::config::get_db_path()?)?;
//! let mut radio = Radio::open(catalog, store, RngSource::thread(), RadioConfig::default())?;
//!
//! let first = radio.next_track("miles-davis", None, None)?;
//! if let Some(track) = first {
//!     let second = radio.next_track("miles-davis", Some(track.artist.as_str()), None)?;
//!     println!("{second:?}");
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod algorithm;
pub mod catalog;
pub mod cli;
pub mod completion;
pub mod config;
pub mod radio;
pub mod session;
pub mod state;
pub mod store;
