//! Rating aggregation.

use crate::types::{Catalog, MovieId};

impl Catalog {
    /// Mean score over every rating for `movie_id`, or `0.0` when the movie
    /// has none. Scans the full rating list.
    pub fn average_rating(&self, movie_id: MovieId) -> f64 {
        let (total, count) = self
            .ratings
            .iter()
            .filter(|r| r.movie_id == movie_id)
            .fold((0.0, 0u32), |(total, count), r| (total + r.score, count + 1));

        if count == 0 {
            0.0
        } else {
            total / count as f64
        }
    }
}
