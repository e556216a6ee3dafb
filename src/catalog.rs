//! # Catalog Module
//!
//! The radio never talks to a music service directly. Everything it knows
//! about artists and tracks comes through the [`Catalog`] trait:
//!
//! - related artists of an artist
//! - artists in a user's collection
//! - top tracks of an artist
//! - tracks of an artist that a user owns
//!
//! [`JsonCatalog`] is a file-backed implementation used by the command line
//! tool, tests and benchmarks. Remote services plug in by implementing the
//! trait; their transport errors surface as `Err` and are not interpreted by
//! the selection algorithm.

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// Extras requested alongside top tracks.
pub const TOP_TRACK_EXTRAS: &[&str] = &["playCount", "isInCollection"];

/// A playable item as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Unique track key.
    pub key: String,
    #[serde(default)]
    pub name: String,
    /// Key of the performing artist.
    #[serde(default)]
    pub artist: String,
    #[serde(default = "streamable_by_default")]
    pub can_stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_in_collection: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_count: Option<u64>,
}

const fn streamable_by_default() -> bool {
    true
}

impl Track {
    /// Streamable track with no extras.
    pub fn new(key: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: String::new(),
            artist: artist.into(),
            can_stream: true,
            is_in_collection: None,
            play_count: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_stream(mut self, can_stream: bool) -> Self {
        self.can_stream = can_stream;
        self
    }

    #[must_use]
    pub fn with_play_count(mut self, play_count: u64) -> Self {
        self.play_count = Some(play_count);
        self
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.name.is_empty(), self.artist.is_empty()) {
            (true, _) => write!(f, "{}", self.key),
            (false, true) => write!(f, "{} [{}]", self.name, self.key),
            (false, false) => write!(f, "{} - {} [{}]", self.artist, self.name, self.key),
        }
    }
}

/// Provider of related artists, collections and track listings.
pub trait Catalog {
    /// Artists the provider considers similar to `artist`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached.
    fn related_artists(&self, artist: &str) -> Result<Vec<String>>;

    /// Artists with at least one item in `user`'s collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached.
    fn artists_in_collection(&self, user: &str) -> Result<Vec<String>>;

    /// Up to `count` top streamable tracks of `artist`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached.
    fn tracks_for_artist(&self, artist: &str, count: usize, extras: &[&str]) -> Result<Vec<Track>>;

    /// Tracks of `artist` that `user` owns.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached.
    fn tracks_for_artist_in_collection(&self, artist: &str, user: &str) -> Result<Vec<Track>>;
}

impl<C: Catalog + ?Sized> Catalog for &C {
    fn related_artists(&self, artist: &str) -> Result<Vec<String>> {
        (**self).related_artists(artist)
    }

    fn artists_in_collection(&self, user: &str) -> Result<Vec<String>> {
        (**self).artists_in_collection(user)
    }

    fn tracks_for_artist(&self, artist: &str, count: usize, extras: &[&str]) -> Result<Vec<Track>> {
        (**self).tracks_for_artist(artist, count, extras)
    }

    fn tracks_for_artist_in_collection(&self, artist: &str, user: &str) -> Result<Vec<Track>> {
        (**self).tracks_for_artist_in_collection(artist, user)
    }
}

/// An artist as described in a catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtistEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub related: Vec<String>,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// What a single user owns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionEntry {
    #[serde(default)]
    pub artists: Vec<String>,
    /// Owned track keys.
    #[serde(default)]
    pub tracks: Vec<String>,
}

/// Catalog read from a JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonCatalog {
    #[serde(default)]
    artists: BTreeMap<String, ArtistEntry>,
    #[serde(default)]
    collections: BTreeMap<String, CollectionEntry>,
}

impl JsonCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid catalog.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
        let catalog = Self::from_json_str(&json)
            .with_context(|| format!("Invalid catalog file {}", path.display()))?;
        debug!(
            "Loaded catalog with {} artists and {} collections from {}",
            catalog.artists.len(),
            catalog.collections.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse a catalog document.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a valid catalog.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut catalog: Self = serde_json::from_str(json).context("Failed to parse catalog JSON")?;
        // Tracks listed under an artist belong to that artist unless stated otherwise.
        for (key, entry) in &mut catalog.artists {
            for track in &mut entry.tracks {
                if track.artist.is_empty() {
                    track.artist.clone_from(key);
                }
            }
        }
        Ok(catalog)
    }

    /// Add or replace an artist.
    pub fn add_artist(&mut self, key: &str, related: &[&str], tracks: Vec<Track>) -> &mut Self {
        let tracks = tracks
            .into_iter()
            .map(|mut track| {
                if track.artist.is_empty() {
                    track.artist = key.to_string();
                }
                track
            })
            .collect();
        self.artists.insert(
            key.to_string(),
            ArtistEntry {
                name: String::new(),
                related: related.iter().map(ToString::to_string).collect(),
                tracks,
            },
        );
        self
    }

    /// Add or replace a user's collection.
    pub fn add_collection(&mut self, user: &str, artists: &[&str], tracks: &[&str]) -> &mut Self {
        self.collections.insert(
            user.to_string(),
            CollectionEntry {
                artists: artists.iter().map(ToString::to_string).collect(),
                tracks: tracks.iter().map(ToString::to_string).collect(),
            },
        );
        self
    }

    /// Every artist key, sorted.
    pub fn artist_keys(&self) -> impl Iterator<Item = &str> {
        self.artists.keys().map(String::as_str)
    }

    fn is_owned_by_anyone(&self, track_key: &str) -> bool {
        self.collections
            .values()
            .any(|collection| collection.tracks.iter().any(|key| key == track_key))
    }
}

impl Catalog for JsonCatalog {
    fn related_artists(&self, artist: &str) -> Result<Vec<String>> {
        Ok(self
            .artists
            .get(artist)
            .map(|entry| entry.related.clone())
            .unwrap_or_default())
    }

    fn artists_in_collection(&self, user: &str) -> Result<Vec<String>> {
        Ok(self
            .collections
            .get(user)
            .map(|collection| collection.artists.clone())
            .unwrap_or_default())
    }

    fn tracks_for_artist(&self, artist: &str, count: usize, extras: &[&str]) -> Result<Vec<Track>> {
        let Some(entry) = self.artists.get(artist) else {
            return Ok(Vec::new());
        };

        let with_play_count = extras.contains(&"playCount");
        let with_collection = extras.contains(&"isInCollection");

        let mut tracks: Vec<Track> = entry.tracks.iter().filter(|track| track.can_stream).cloned().collect();
        // Stable sort keeps file order among equally popular tracks.
        tracks.sort_by(|a, b| b.play_count.unwrap_or(0).cmp(&a.play_count.unwrap_or(0)));
        tracks.truncate(count);

        for track in &mut tracks {
            if !with_play_count {
                track.play_count = None;
            }
            track.is_in_collection = with_collection.then(|| self.is_owned_by_anyone(&track.key));
        }

        Ok(tracks)
    }

    fn tracks_for_artist_in_collection(&self, artist: &str, user: &str) -> Result<Vec<Track>> {
        let (Some(entry), Some(collection)) = (self.artists.get(artist), self.collections.get(user)) else {
            return Ok(Vec::new());
        };

        let owned: HashSet<&str> = collection.tracks.iter().map(String::as_str).collect();
        Ok(entry
            .tracks
            .iter()
            .filter(|track| owned.contains(track.key.as_str()))
            .cloned()
            .map(|mut track| {
                track.is_in_collection = Some(true);
                track
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "artists": {
            "a": {
                "name": "Artist A",
                "related": ["b", "c"],
                "tracks": [
                    {"key": "a1", "name": "One", "canStream": true, "playCount": 5},
                    {"key": "a2", "name": "Two", "canStream": false, "playCount": 50},
                    {"key": "a3", "name": "Three", "playCount": 9}
                ]
            },
            "b": {"related": ["a"]}
        },
        "collections": {
            "u": {"artists": ["a"], "tracks": ["a3"]}
        }
    }"#;

    fn sample() -> JsonCatalog {
        JsonCatalog::from_json_str(SAMPLE).expect("sample catalog should parse")
    }

    #[test]
    fn test_related_artists() {
        let catalog = sample();
        assert_eq!(catalog.related_artists("a").unwrap(), vec!["b", "c"]);
        assert!(catalog.related_artists("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_track_artist_filled_from_entry() {
        let catalog = sample();
        let tracks = catalog.tracks_for_artist("a", 20, &[]).unwrap();
        assert!(tracks.iter().all(|track| track.artist == "a"));
    }

    #[test]
    fn test_top_tracks_are_streamable_and_ordered() {
        let catalog = sample();
        let tracks = catalog.tracks_for_artist("a", 20, TOP_TRACK_EXTRAS).unwrap();

        let keys: Vec<&str> = tracks.iter().map(|track| track.key.as_str()).collect();
        assert_eq!(keys, vec!["a3", "a1"]);
        assert_eq!(tracks[0].is_in_collection, Some(true));
        assert_eq!(tracks[1].is_in_collection, Some(false));
        assert_eq!(tracks[0].play_count, Some(9));
    }

    #[test]
    fn test_top_tracks_respect_count_and_extras() {
        let catalog = sample();
        let tracks = catalog.tracks_for_artist("a", 1, &[]).unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].play_count, None);
        assert_eq!(tracks[0].is_in_collection, None);
    }

    #[test]
    fn test_collection_lookups() {
        let catalog = sample();
        assert_eq!(catalog.artists_in_collection("u").unwrap(), vec!["a"]);
        assert!(catalog.artists_in_collection("stranger").unwrap().is_empty());

        let owned = catalog.tracks_for_artist_in_collection("a", "u").unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].key, "a3");
        assert_eq!(owned[0].is_in_collection, Some(true));

        assert!(catalog.tracks_for_artist_in_collection("b", "u").unwrap().is_empty());
    }

    #[test]
    fn test_builder_matches_parsed_catalog() {
        let mut catalog = JsonCatalog::new();
        catalog
            .add_artist("x", &["y"], vec![Track::new("x1", "")])
            .add_collection("u", &["x"], &["x1"]);

        assert_eq!(catalog.related_artists("x").unwrap(), vec!["y"]);
        assert_eq!(catalog.tracks_for_artist("x", 5, &[]).unwrap()[0].artist, "x");
        assert_eq!(catalog.artist_keys().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(JsonCatalog::from_json_str("[1, 2").is_err());
    }

    #[test]
    fn test_track_display() {
        let track = Track::new("t1", "a").with_name("Song");
        assert_eq!(track.to_string(), "a - Song [t1]");
        assert_eq!(Track::new("t2", "").to_string(), "t2");
    }
}
