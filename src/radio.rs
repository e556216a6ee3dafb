//! Station orchestration: one call to [`Radio::next_track`] per track.
//!
//! Each request runs the artist and track resolvers in a loop. When no
//! artist can be found, constraints are relaxed in a fixed order:
//!
//! 1. forget the artist blacklist built up during this request
//! 2. forget the recently played tracks, which makes every artist rejected
//!    so far eligible again
//! 3. give up, the station has ended
//!
//! An artist that is found but has no unplayed track is set aside until the
//! history is cleared; that does not advance the relaxation order.

use crate::algorithm::{RandomSource, Selector};
use crate::catalog::{Catalog, Track};
use crate::config::RadioConfig;
use crate::session::Session;
use crate::store::{StateStore, STATE_NAME};
use anyhow::Result;
use log::{debug, info, warn};
use std::collections::HashSet;

/// Constraint relaxation applied after artist resolution comes up empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    ClearBlacklist,
    ClearHistory,
    GiveUp,
}

impl Escalation {
    /// Relaxation for the `failures`-th empty artist resolution of a request.
    #[must_use]
    pub const fn after(failures: u32) -> Self {
        match failures {
            0 | 1 => Self::ClearBlacklist,
            2 => Self::ClearHistory,
            _ => Self::GiveUp,
        }
    }
}

/// A radio station over a catalog, persisting its session in a store.
pub struct Radio<C, S, R> {
    catalog: C,
    session: Session<S>,
    rng: R,
    config: RadioConfig,
}

impl<C, S, R> Radio<C, S, R>
where
    C: Catalog,
    S: StateStore,
    R: RandomSource,
{
    /// Load the saved station state from `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the saved state cannot be read.
    pub fn open(catalog: C, store: S, rng: R, config: RadioConfig) -> Result<Self> {
        let session = Session::load(store, STATE_NAME, config.no_repeat_track_count)?;
        Ok(Self::new(catalog, session, rng, config))
    }

    pub const fn new(catalog: C, session: Session<S>, rng: R, config: RadioConfig) -> Self {
        Self {
            catalog,
            session,
            rng,
            config,
        }
    }

    /// Choose the next track of the station seeded by `base_artist`.
    ///
    /// Without a `last_artist` a new station starts from a clean state.
    /// With a `user`, only artists and tracks from their collection are
    /// played. `Ok(None)` means the station has run out of tracks.
    ///
    /// The session is saved before returning, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Catalog and store failures are passed through.
    pub fn next_track(
        &mut self,
        base_artist: &str,
        last_artist: Option<&str>,
        user: Option<&str>,
    ) -> Result<Option<Track>> {
        self.session.reset_if_fresh(last_artist);

        let outcome = self.select_track(base_artist, last_artist, user);
        if let Ok(Some(track)) = &outcome {
            info!("Next track: {track}");
            self.session.record_played(&track.key);
        }

        match (outcome, self.session.save()) {
            (Ok(track), Ok(())) => Ok(track),
            (Err(e), Ok(())) | (Ok(_), Err(e)) => Err(e),
            (Err(e), Err(save_err)) => {
                warn!("Station state not saved after failed request: {save_err:#}");
                Err(e)
            }
        }
    }

    fn select_track(
        &mut self,
        base_artist: &str,
        last_artist: Option<&str>,
        user: Option<&str>,
    ) -> Result<Option<Track>> {
        let mut blacklist: HashSet<String> = std::iter::once(base_artist)
            .chain(last_artist)
            .map(ToString::to_string)
            .collect();
        // Artists without an unplayed track. Only a history reset brings them back.
        let mut exhausted: HashSet<String> = HashSet::new();
        // A fresh station drifts away from the base artist itself.
        let pivot = last_artist.unwrap_or(base_artist);
        let mut use_base_artist = self.selector().returns_to_base(last_artist);

        let mut failures = 0;
        let mut misses = 0;
        loop {
            let artist = if use_base_artist {
                Some(base_artist.to_string())
            } else {
                let excluded: HashSet<String> = blacklist.union(&exhausted).cloned().collect();
                self.selector().choose_artist(base_artist, pivot, user, &excluded)?
            };

            let Some(artist) = artist else {
                debug!("Didn't find an artist");
                failures += 1;
                match Escalation::after(failures) {
                    Escalation::ClearBlacklist => {
                        debug!("Clearing blacklist");
                        blacklist.clear();
                        exhausted.clear();
                    }
                    Escalation::ClearHistory => {
                        debug!("Clearing played tracks list");
                        self.session.clear_history();
                        exhausted.clear();
                    }
                    Escalation::GiveUp => {
                        debug!("Giving up");
                        return Ok(None);
                    }
                }
                continue;
            };

            if let Some(track) = self.selector().choose_track(&artist, user)? {
                return Ok(Some(track));
            }

            misses += 1;
            debug!("No playable track by {artist}, setting it aside");
            if misses >= self.config.max_track_misses {
                warn!("Giving up after {misses} artists without a playable track");
                return Ok(None);
            }
            // The base artist would be picked again on every pass otherwise.
            use_base_artist = false;
            exhausted.insert(artist);
        }
    }

    fn selector(&mut self) -> Selector<'_, C, S, R> {
        Selector::new(&self.catalog, &mut self.session, &mut self.rng, &self.config)
    }

    #[must_use]
    pub const fn session(&self) -> &Session<S> {
        &self.session
    }

    #[must_use]
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    #[must_use]
    pub const fn config(&self) -> &RadioConfig {
        &self.config
    }
}
