//! Artist and track selection for radio stations.
//!
//! A station is a random walk over the related-artist graph, anchored to
//! the artist that seeded it:
//!
//! ```text
//! next_artist = base artist              on the first pick, or with probability 1/N
//!             = random(candidates(last)) otherwise
//!
//! candidates(a) = related(a) - blacklist                       (no user)
//!               = (related(a) - blacklist) ∩ collection(user)  (user)
//! ```
//!
//! When a user's collection has nothing near the last artist, the search
//! pivots through related artists, up to a bounded depth, until some pivot
//! yields candidates. Track selection then picks a random streamable track
//! of the chosen artist that was not played recently.
//!
//! All catalog lookups go through the session cache, so a station only
//! asks the provider once per artist or user.

use crate::catalog::{Catalog, Track, TOP_TRACK_EXTRAS};
use crate::config::RadioConfig;
use crate::session::Session;
use crate::store::StateStore;
use anyhow::Result;
use log::{debug, trace};
use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

/// Source of the random decisions made while selecting.
///
/// Production code uses [`RngSource`]; tests can script exact outcomes.
pub trait RandomSource {
    /// Uniform roll in `1..=sides`.
    fn roll(&mut self, sides: u32) -> u32;

    /// Uniform index in `0..len`. Only called with `len > 0`.
    fn pick(&mut self, len: usize) -> usize;
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn roll(&mut self, sides: u32) -> u32 {
        (**self).roll(sides)
    }

    fn pick(&mut self, len: usize) -> usize {
        (**self).pick(len)
    }
}

/// [`RandomSource`] backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R>(R);

impl<R: Rng> RngSource<R> {
    pub const fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl RngSource<ThreadRng> {
    #[must_use]
    pub fn thread() -> Self {
        Self(rand::thread_rng())
    }
}

impl RngSource<StdRng> {
    /// Reproducible sequence.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    #[must_use]
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn roll(&mut self, sides: u32) -> u32 {
        self.0.gen_range(1..=sides.max(1))
    }

    fn pick(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

/// Whether the next pick goes back to the base artist.
///
/// Always on a fresh station. Otherwise one roll of a `frequency`-sided die;
/// a frequency of 0 never returns to base after the first pick.
pub fn returns_to_base<R: RandomSource + ?Sized>(
    last_artist: Option<&str>,
    frequency: u32,
    rng: &mut R,
) -> bool {
    match (last_artist, frequency) {
        (None, _) => true,
        (Some(_), 0) => false,
        (Some(_), 1) => true,
        (Some(_), sides) => rng.roll(sides) == 1,
    }
}

fn choose<'t, T, R: RandomSource + ?Sized>(items: &'t [T], rng: &mut R) -> Option<&'t T> {
    match items.len() {
        0 => None,
        len => items.get(rng.pick(len)),
    }
}

/// Keeps the first occurrence of every key, preserving order.
fn unique<'k>(keys: impl IntoIterator<Item = &'k String>) -> Vec<String> {
    let mut seen: HashSet<&String> = HashSet::new();
    keys.into_iter()
        .filter(|key| seen.insert(*key))
        .cloned()
        .collect()
}

/// Artist and track resolution over one session.
///
/// Borrows everything it needs for the duration of a single step of a
/// track request.
pub struct Selector<'a, C: ?Sized, S, R: ?Sized> {
    catalog: &'a C,
    session: &'a mut Session<S>,
    rng: &'a mut R,
    config: &'a RadioConfig,
}

impl<'a, C, S, R> Selector<'a, C, S, R>
where
    C: Catalog + ?Sized,
    S: StateStore,
    R: RandomSource + ?Sized,
{
    pub fn new(catalog: &'a C, session: &'a mut Session<S>, rng: &'a mut R, config: &'a RadioConfig) -> Self {
        Self {
            catalog,
            session,
            rng,
            config,
        }
    }

    /// [`returns_to_base`] with the configured frequency.
    pub fn returns_to_base(&mut self, last_artist: Option<&str>) -> bool {
        returns_to_base(last_artist, self.config.return_to_base_frequency, &mut *self.rng)
    }

    /// Pick an artist related to `last_artist`, uniformly among the candidates.
    ///
    /// `None` means no artist could be found.
    ///
    /// # Errors
    ///
    /// Only catalog failures are errors.
    pub fn choose_artist(
        &mut self,
        base_artist: &str,
        last_artist: &str,
        user: Option<&str>,
        blacklist: &HashSet<String>,
    ) -> Result<Option<String>> {
        debug!("Choosing artist with base artist {base_artist} and last artist {last_artist}");

        let candidates = self.candidate_artists(last_artist, user, blacklist)?;
        let chosen = choose(&candidates, &mut *self.rng).cloned();

        debug!("Chose artist: {chosen:?}");
        Ok(chosen)
    }

    /// Every artist [`Self::choose_artist`] may pick from.
    ///
    /// # Errors
    ///
    /// Only catalog failures are errors.
    pub fn candidate_artists(
        &mut self,
        last_artist: &str,
        user: Option<&str>,
        blacklist: &HashSet<String>,
    ) -> Result<Vec<String>> {
        let mut visited = HashSet::new();
        self.search_candidates(last_artist, user, blacklist, &mut visited, 1)
    }

    /// One level of the candidate search.
    ///
    /// `visited` holds every pivot already expanded during this search and
    /// only grows. `depth` starts at 1.
    fn search_candidates(
        &mut self,
        pivot: &str,
        user: Option<&str>,
        blacklist: &HashSet<String>,
        visited: &mut HashSet<String>,
        depth: usize,
    ) -> Result<Vec<String>> {
        debug!("Finding candidate artists with last artist {pivot}");

        let related = self.related_artists(pivot)?;
        let allowed = unique(related.iter().filter(|artist| !blacklist.contains(*artist)));

        let Some(user) = user else {
            debug!("Candidate artists: {allowed:?}");
            return Ok(allowed);
        };

        let collection: HashSet<String> = self.collection_artists(user)?.into_iter().collect();
        debug!("Related artists: {allowed:?}, collection artists: {}, blacklist: {blacklist:?}", collection.len());

        let candidates: Vec<String> = allowed.into_iter().filter(|artist| collection.contains(artist)).collect();
        debug!("Candidate artists: {candidates:?}");

        if !candidates.is_empty() || depth >= self.config.max_related_artist_depth {
            return Ok(candidates);
        }

        visited.insert(pivot.to_string());
        let pivots = unique(related.iter().filter(|artist| !visited.contains(*artist)));
        debug!("Recursing related artists {pivots:?}, recurse blacklist: {visited:?}");

        for next_pivot in pivots {
            // A deeper branch may have expanded this one already.
            if visited.contains(&next_pivot) {
                continue;
            }
            let found = self.search_candidates(&next_pivot, Some(user), blacklist, visited, depth + 1)?;
            if !found.is_empty() {
                return Ok(found);
            }
        }

        Ok(Vec::new())
    }

    /// Pick a streamable, recently unplayed track by `artist`.
    ///
    /// With a `user`, only tracks from their collection are considered;
    /// otherwise the artist's top tracks.
    ///
    /// # Errors
    ///
    /// Only catalog failures are errors.
    pub fn choose_track(&mut self, artist: &str, user: Option<&str>) -> Result<Option<Track>> {
        let tracks = self.artist_tracks(artist, user)?;

        let candidates: Vec<&Track> = tracks
            .iter()
            .filter(|track| track.can_stream && !self.session.was_played(&track.key))
            .collect();
        trace!("{} of {} tracks by {artist} are playable", candidates.len(), tracks.len());

        let chosen = choose(&candidates, &mut *self.rng).map(|track| (*track).clone());
        debug!("Chose track: {:?}", chosen.as_ref().map(|track| &track.key));
        Ok(chosen)
    }

    fn related_artists(&mut self, artist: &str) -> Result<Vec<String>> {
        let catalog = self.catalog;
        self.session
            .cached(&format!("related_artists_{artist}"), || catalog.related_artists(artist))
    }

    fn collection_artists(&mut self, user: &str) -> Result<Vec<String>> {
        let catalog = self.catalog;
        self.session
            .cached(&format!("artists_in_collection_{user}"), || catalog.artists_in_collection(user))
    }

    fn artist_tracks(&mut self, artist: &str, user: Option<&str>) -> Result<Vec<Track>> {
        let catalog = self.catalog;
        match user {
            Some(user) => self.session.cached(&format!("artist_tracks_in_collection_{artist}_{user}"), || {
                catalog.tracks_for_artist_in_collection(artist, user)
            }),
            None => {
                let count = self.config.top_tracks_count;
                self.session.cached(&format!("artist_tracks_{artist}"), || {
                    catalog.tracks_for_artist(artist, count, TOP_TRACK_EXTRAS)
                })
            }
        }
    }
}
