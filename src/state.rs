//! Persisted radio session state.
//!
//! A [`SessionState`] is the only thing that survives between two
//! `next_track` requests: the recently played track keys and a cache of
//! catalog lookups. It serializes to JSON so any [`crate::store::StateStore`]
//! can keep it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};

/// Default number of recent tracks that may not be repeated.
pub const NO_REPEAT_TRACK_COUNT: usize = 25;

/// State carried across track requests of one station.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Recently played track keys, oldest first.
    #[serde(default)]
    pub played_tracks: VecDeque<String>,
    /// Lazily filled catalog lookups keyed by request, never invalidated.
    #[serde(default)]
    pub cache: BTreeMap<String, Value>,
}

impl SessionState {
    /// Fresh state with empty history and cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `track_key` to the history, evicting the oldest entries
    /// once `capacity` is exceeded.
    ///
    /// Duplicates are not collapsed here; the track resolver never picks a
    /// key that is already present.
    pub fn push_played(&mut self, track_key: &str, capacity: usize) {
        self.played_tracks.push_back(track_key.to_string());
        while self.played_tracks.len() > capacity {
            if let Some(evicted) = self.played_tracks.pop_front() {
                log::trace!("Evicted `{evicted}' from played tracks");
            }
        }
    }

    /// Whether `track_key` was played recently.
    #[must_use]
    pub fn was_played(&self, track_key: &str) -> bool {
        self.played_tracks.iter().any(|key| key == track_key)
    }

    pub fn clear_played(&mut self) {
        self.played_tracks.clear();
    }
}
