//! # Combined Recommendation Store
//!
//! Sessions that ask for the same genre pool their results here. For every
//! `(genre, movie)` pair the store keeps a running mean of the averages that
//! sessions reported, and how many reports went into it.
//!
//! The whole map sits behind one `Mutex`. Critical sections are a single
//! merge or a single top-N read, with no I/O inside, so finer-grained
//! locking would buy nothing.
//!
//! Concurrent merges for the same genre are not ordered: the final mean
//! depends on which session got the lock first.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::debug;

use catalog::{Catalog, Movie, MovieId};

/// How many combined entries a genre lookup returns
pub const DEFAULT_COMBINED_LIMIT: usize = 5;

/// Source of per-movie average ratings fed into a merge.
///
/// `Catalog` is the production implementation; tests can substitute fixed
/// values.
pub trait AverageRating {
    fn average_rating(&self, movie_id: MovieId) -> f64;
}

impl AverageRating for Catalog {
    fn average_rating(&self, movie_id: MovieId) -> f64 {
        Catalog::average_rating(self, movie_id)
    }
}

/// Running aggregate for one movie within one genre
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "MovieID")]
    pub movie_id: MovieId,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Genres")]
    pub genres: Vec<String>,
    /// Mean of every average merged so far, one sample per merge
    #[serde(rename = "AvgRating")]
    pub avg_rating: f64,
    /// Number of merges that touched this entry (always >= 1)
    #[serde(rename = "Count")]
    pub sample_count: u32,
}

impl Recommendation {
    fn first(movie: &Movie, avg_rating: f64) -> Self {
        Self {
            movie_id: movie.id,
            title: movie.title.clone(),
            genres: movie.genres.clone(),
            avg_rating,
            sample_count: 1,
        }
    }

    /// Fold one more reported average into the running mean
    fn absorb(&mut self, avg_rating: f64) {
        let count = self.sample_count as f64;
        self.avg_rating = (self.avg_rating * count + avg_rating) / (count + 1.0);
        self.sample_count += 1;
    }
}

type GenreEntries = BTreeMap<MovieId, Recommendation>;

/// Shared store of combined recommendations, keyed by genre then movie id.
///
/// Share it between sessions with an `Arc`; all access goes through
/// [`merge`](Self::merge) and [`top_combined`](Self::top_combined).
#[derive(Debug, Default)]
pub struct CombinedStore {
    genres: Mutex<HashMap<String, GenreEntries>>,
}

impl CombinedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one session's batch for `genre` into the store.
    ///
    /// Averages are looked up before the lock is taken; the lookup-or-insert
    /// and update of every entry in the batch then happens under a single
    /// lock acquisition. The genre key is created even for an empty batch.
    ///
    /// Returns how many entries were newly inserted.
    pub fn merge<'a, R>(
        &self,
        genre: &str,
        movies: impl IntoIterator<Item = &'a Movie>,
        ratings: &R,
    ) -> usize
    where
        R: AverageRating + ?Sized,
    {
        let scored: Vec<(&Movie, f64)> = movies
            .into_iter()
            .map(|movie| (movie, ratings.average_rating(movie.id)))
            .collect();

        let mut genres = self.lock();
        let entries = genres.entry(genre.to_string()).or_default();

        let mut inserted = 0;
        for (movie, avg_rating) in scored {
            entries
                .entry(movie.id)
                .and_modify(|existing| existing.absorb(avg_rating))
                .or_insert_with(|| {
                    inserted += 1;
                    Recommendation::first(movie, avg_rating)
                });
        }

        debug!(
            genre,
            inserted,
            total = entries.len(),
            "Merged recommendation batch"
        );
        inserted
    }

    /// Up to `limit` combined entries for `genre`, in ascending movie id
    /// order (not ranked by rating).
    ///
    /// `None` means no session has merged anything for this genre yet.
    pub fn top_combined(&self, genre: &str, limit: usize) -> Option<Vec<Recommendation>> {
        let genres = self.lock();
        genres
            .get(genre)
            .map(|entries| entries.values().take(limit).cloned().collect())
    }

    /// Every critical section leaves the map consistent, so a panic in
    /// another holder does not invalidate the data.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, GenreEntries>> {
        self.genres.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
