//! Session and cache management.
//!
//! A [`Session`] owns the [`SessionState`] of one station together with the
//! store it came from. It is loaded when a track is requested, mutated while
//! the selection runs, and saved back when the request ends.

use crate::state::SessionState;
use crate::store::StateStore;
use anyhow::{Context, Result};
use log::{debug, trace, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::VecDeque;

#[derive(Debug)]
pub struct Session<S> {
    store: S,
    name: String,
    state: SessionState,
    capacity: usize,
}

impl<S: StateStore> Session<S> {
    /// Load the state saved under `name`, or start empty if there is none.
    ///
    /// `capacity` bounds the played-track history.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn load(store: S, name: &str, capacity: usize) -> Result<Self> {
        let state = store
            .load(name)
            .with_context(|| format!("Failed to load session state `{name}'"))?
            .unwrap_or_default();
        debug!(
            "Loaded session `{name}' with {} played tracks and {} cached lookups",
            state.played_tracks.len(),
            state.cache.len()
        );

        let mut session = Self {
            store,
            name: name.to_string(),
            state,
            capacity,
        };
        // A smaller capacity than the one the state was saved with applies right away.
        session.trim_history();
        Ok(session)
    }

    /// Start a new station when no artist has been played yet.
    ///
    /// Discards both history and cache. Returns `true` when the state was reset.
    pub fn reset_if_fresh(&mut self, last_artist: Option<&str>) -> bool {
        if last_artist.is_some() {
            return false;
        }
        debug!("No last artist, starting a fresh station");
        self.state = SessionState::new();
        true
    }

    /// Cached value for `key`, computing and storing it on first use.
    ///
    /// Entries are never invalidated. An entry that no longer decodes as `T`
    /// is recomputed.
    ///
    /// # Errors
    ///
    /// Returns whatever `compute` returns, or an error if the computed value
    /// cannot be serialized.
    pub fn cached<T, F>(&mut self, key: &str, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        if let Some(value) = self.state.cache.get(key) {
            match serde_json::from_value(value.clone()) {
                Ok(cached) => {
                    trace!("Cache hit for `{key}'");
                    return Ok(cached);
                }
                Err(e) => warn!("Discarding unreadable cache entry `{key}': {e}"),
            }
        }

        trace!("Cache miss for `{key}'");
        let computed = compute()?;
        let value = serde_json::to_value(&computed)
            .with_context(|| format!("Failed to cache value for `{key}'"))?;
        self.state.cache.insert(key.to_string(), value);
        Ok(computed)
    }

    /// Remember `track_key` as played, evicting the oldest entry when the
    /// history is full.
    pub fn record_played(&mut self, track_key: &str) {
        self.state.push_played(track_key, self.capacity);
    }

    #[must_use]
    pub fn was_played(&self, track_key: &str) -> bool {
        self.state.was_played(track_key)
    }

    /// Forget the play history. The cache survives.
    pub fn clear_history(&mut self) {
        self.state.clear_played();
    }

    /// Persist the full state.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn save(&self) -> Result<()> {
        self.store
            .save(&self.name, &self.state)
            .with_context(|| format!("Failed to save session state `{}'", self.name))
    }

    #[must_use]
    pub fn played_tracks(&self) -> &VecDeque<String> {
        &self.state.played_tracks
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn trim_history(&mut self) {
        while self.state.played_tracks.len() > self.capacity {
            self.state.played_tracks.pop_front();
        }
    }
}
