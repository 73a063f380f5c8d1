//! Genre ranking and genre-filtered movie lookup.
//!
//! Both operations scan the whole catalog on every call. There is no
//! precomputed genre index: labels are free text and queries match by
//! substring, so an exact-key index would not help.

use crate::types::{Catalog, Movie};
use rayon::prelude::*;
use std::collections::HashMap;

/// How many genres the genre menu shows
pub const DEFAULT_GENRE_LIMIT: usize = 15;

/// How many movies a genre query returns
pub const DEFAULT_MOVIE_LIMIT: usize = 5;

impl Catalog {
    /// The `limit` genre labels carried by the most movies.
    ///
    /// Ordered by movie count, highest first. Equal counts are ordered by
    /// label so the menu is the same on every call.
    pub fn top_genres(&self, limit: usize) -> Vec<String> {
        let counts: HashMap<&str, usize> = self
            .movies
            .par_iter()
            .fold(HashMap::new, |mut local, (_, movie)| {
                for genre in &movie.genres {
                    *local.entry(genre.as_str()).or_insert(0) += 1;
                }
                local
            })
            .reduce(HashMap::new, |mut acc, local| {
                for (genre, count) in local {
                    *acc.entry(genre).or_insert(0) += count;
                }
                acc
            });

        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(limit);
        ranked.into_iter().map(|(genre, _)| genre.to_string()).collect()
    }

    /// Up to `limit` movies with a genre label containing `query`,
    /// ignoring case. "com" matches both "Comedy" and "Action-Comedy".
    ///
    /// Movies come back in ascending id order; they are not ranked.
    pub fn movies_by_genre(&self, query: &str, limit: usize) -> Vec<&Movie> {
        let query = query.to_lowercase();
        self.movies
            .values()
            .filter(|movie| genre_matches(movie, &query))
            .take(limit)
            .collect()
    }
}

/// `query` must already be lowercase
fn genre_matches(movie: &Movie, query: &str) -> bool {
    movie
        .genres
        .iter()
        .any(|genre| genre.to_lowercase().contains(query))
}
