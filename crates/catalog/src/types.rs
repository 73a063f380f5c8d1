//! Core domain types for the movie catalog.
//!
//! The catalog is built once at startup and never mutated afterwards, so it
//! can be shared across tasks behind an `Arc` without any locking.

use serde::Serialize;
use std::collections::BTreeMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Identifier of the user who submitted a rating. Signed: negative ids
/// are accepted both in the ratings table and in the protocol handshake.
pub type UserId = i64;

/// Unique identifier for a movie (always > 0 for well-formed input)
pub type MovieId = u32;

// =============================================================================
// Records
// =============================================================================

/// A movie as listed in the movies table.
///
/// The serialized field names are part of the HTTP contract
/// (`{"MovieID": .., "Title": .., "Genres": [..]}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movie {
    #[serde(rename = "MovieID")]
    pub id: MovieId,
    #[serde(rename = "Title")]
    pub title: String,
    /// Free-text genre labels in file order, e.g. `["Animation", "Comedy"]`
    #[serde(rename = "Genres")]
    pub genres: Vec<String>,
}

/// A single score given by a user to a movie
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rating {
    pub user_id: UserId,
    /// Not checked against the movie table at load time
    pub movie_id: MovieId,
    pub score: f64,
}

// =============================================================================
// Catalog - the in-memory database
// =============================================================================

/// Movies and ratings loaded at startup.
///
/// Movies are kept in a `BTreeMap` so every scan over the catalog visits
/// them in ascending id order. Ratings are a flat list in file order.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    pub(crate) movies: BTreeMap<MovieId, Movie>,
    pub(crate) ratings: Vec<Rating>,
}

impl Catalog {
    /// Creates a new, empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a movie by ID
    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    /// All movies in ascending id order
    pub fn movies(&self) -> impl Iterator<Item = &Movie> {
        self.movies.values()
    }

    /// All ratings in load order
    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    /// Insert a movie, replacing any earlier row with the same id
    pub fn insert_movie(&mut self, movie: Movie) {
        self.movies.insert(movie.id, movie);
    }

    pub fn insert_rating(&mut self, rating: Rating) {
        self.ratings.push(rating);
    }

    /// Get (movies, ratings) counts for logging
    pub fn counts(&self) -> (usize, usize) {
        (self.movies.len(), self.ratings.len())
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty() && self.ratings.is_empty()
    }
}
