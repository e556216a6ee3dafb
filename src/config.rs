//! # Configuration Module
//!
//! This module handles the radio tunables and data directory setup for Airwaves.
//!
//! ## Data Storage
//!
//! Airwaves stores its station state in the platform-standard data directory:
//! - Linux: `~/.local/share/airwaves/`
//! - macOS: `~/Library/Application Support/airwaves/`
//! - Windows: `%APPDATA%\airwaves\`
//!
//! ## Tunables
//!
//! [`RadioConfig`] holds the selection constants. Every field has a default,
//! and a JSON file may override any subset of them:
//!
//! ```json
//! { "return_to_base_frequency": 3, "top_tracks_count": 10 }
//! ```

use crate::state::NO_REPEAT_TRACK_COUNT;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Returns the platform-appropriate database file path.
///
/// Creates the `airwaves` data directory if it doesn't exist. The database
/// file is named `radio.db`.
///
/// # Errors
///
/// This function will return an error if:
/// - The system data directory cannot be determined
/// - The airwaves subdirectory cannot be created due to permissions
///
/// # Examples
///
/// ```no_run
/// use airwaves::config::get_db_path;
///
/// let db_path = get_db_path()?;
/// println!("Station state lives in {}", db_path.display());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn get_db_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("radio.db"))
}

/// Returns the platform-appropriate data directory for Airwaves, creating it
/// on demand.
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined or created.
pub fn get_data_dir() -> Result<PathBuf> {
    // Get platform-appropriate data directory
    let data_dir = dirs::data_dir()
        .ok_or_else(|| anyhow::anyhow!(
            "Could not determine system data directory. Please ensure your platform supports standard data directories."
        ))?;

    let airwaves_dir = data_dir.join("airwaves");
    fs::create_dir_all(&airwaves_dir)
        .with_context(|| format!(
            "Failed to create Airwaves data directory at {}. Please check file permissions.",
            airwaves_dir.display()
        ))?;

    Ok(airwaves_dir)
}

/// Selection constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioConfig {
    /// The base artist comes back with probability `1 / return_to_base_frequency`.
    pub return_to_base_frequency: u32,
    /// How many recent tracks may not repeat.
    pub no_repeat_track_count: usize,
    /// How many top tracks of an artist to choose from when there is no user.
    pub top_tracks_count: usize,
    /// How deep the candidate search may walk the related-artist graph.
    pub max_related_artist_depth: usize,
    /// Artists that turn out to have no playable track before a request gives up.
    pub max_track_misses: usize,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            return_to_base_frequency: 5,
            no_repeat_track_count: NO_REPEAT_TRACK_COUNT,
            top_tracks_count: 20,
            max_related_artist_depth: 3,
            max_track_misses: 50,
        }
    }
}

impl RadioConfig {
    /// Load overrides from a JSON file. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read radio config {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid radio config {}", path.display()))
    }
}

/// Configuration for runtime behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Path to the database file
    pub db_path: PathBuf,
    pub radio: RadioConfig,
}

impl RuntimeConfig {
    /// Resolve the runtime configuration from optional overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if no database path is given and the data directory
    /// is unusable, or if the config file is invalid.
    pub fn resolve(db_path: Option<PathBuf>, config_path: Option<&Path>) -> Result<Self> {
        let db_path = match db_path {
            Some(path) => path,
            None => get_db_path()?,
        };
        let radio = match config_path {
            Some(path) => RadioConfig::from_file(path)?,
            None => RadioConfig::default(),
        };
        Ok(Self { db_path, radio })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_db_path_structure() {
        let path = get_db_path().expect("Should get valid path");

        assert_eq!(path.file_name().unwrap(), "radio.db");
        let parent = path.parent().expect("Should have parent directory");
        assert_eq!(parent.file_name().unwrap(), "airwaves");
        assert!(parent.is_dir());
        assert!(path.is_absolute(), "Database path should be absolute");
    }

    #[test]
    fn test_get_db_path_consistent_results() {
        let path1 = get_db_path().expect("First call should succeed");
        let path2 = get_db_path().expect("Second call should succeed");

        assert_eq!(path1, path2);
    }

    #[test]
    fn test_radio_config_defaults() {
        let config = RadioConfig::default();

        assert_eq!(config.return_to_base_frequency, 5);
        assert_eq!(config.no_repeat_track_count, 25);
        assert_eq!(config.top_tracks_count, 20);
        assert_eq!(config.max_related_artist_depth, 3);
    }

    #[test]
    fn test_radio_config_partial_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("radio.json");
        fs::write(&path, r#"{"top_tracks_count": 5}"#).expect("write config");

        let config = RadioConfig::from_file(&path).expect("partial config should load");
        assert_eq!(config.top_tracks_count, 5);
        assert_eq!(config.return_to_base_frequency, 5);
    }

    #[test]
    fn test_radio_config_invalid_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("radio.json");
        fs::write(&path, "top_tracks_count = 5").expect("write config");

        assert!(RadioConfig::from_file(&path).is_err());
        assert!(RadioConfig::from_file(&temp_dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_runtime_config_resolve_with_overrides() {
        let config = RuntimeConfig::resolve(Some(PathBuf::from("/tmp/test.db")), None)
            .expect("explicit path needs no data dir");

        assert_eq!(config.db_path, PathBuf::from("/tmp/test.db"));
        assert_eq!(config.radio, RadioConfig::default());
    }

    #[test]
    fn test_runtime_config_resolve_with_config_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("radio.json");
        fs::write(&path, r#"{"max_track_misses": 3}"#).expect("write config");

        let config = RuntimeConfig::resolve(Some(temp_dir.path().join("radio.db")), Some(&path))
            .expect("config file should load");
        assert_eq!(config.radio.max_track_misses, 3);
        assert!(RuntimeConfig::resolve(None, Some(&temp_dir.path().join("missing.json"))).is_err());
    }
}
