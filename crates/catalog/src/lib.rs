//! # Catalog Crate
//!
//! This crate loads the movie and rating tables and answers the read-only
//! questions the recommendation server asks about them.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Movie, Rating, Catalog)
//! - **parser**: Parse the CSV tables into records
//! - **index**: Load the tables into a Catalog
//! - **genres**: Genre menu and genre-filtered movie lookup
//! - **ratings**: Average rating per movie
//! - **error**: Error types for loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::Catalog;
//! use std::path::Path;
//!
//! let catalog = Catalog::load_from_files(Path::new("movies.csv"), Path::new("ratings.csv"));
//!
//! for genre in catalog.top_genres(catalog::DEFAULT_GENRE_LIMIT) {
//!     println!("{genre}");
//! }
//! for movie in catalog.movies_by_genre("com", catalog::DEFAULT_MOVIE_LIMIT) {
//!     println!("{}: {:.2}", movie.title, catalog.average_rating(movie.id));
//! }
//! ```
//!
//! Once loaded, a `Catalog` is never mutated again and can be shared across
//! threads behind an `Arc` without locking.

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;
pub mod genres;
pub mod ratings;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use genres::{DEFAULT_GENRE_LIMIT, DEFAULT_MOVIE_LIMIT};
pub use types::{Catalog, Movie, MovieId, Rating, UserId};

#[cfg(test)]
mod tests {
    use super::*;

    fn create_scenario_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert_movie(Movie {
            id: 1,
            title: "A".to_string(),
            genres: vec!["Comedy".to_string()],
        });
        catalog.insert_movie(Movie {
            id: 2,
            title: "B".to_string(),
            genres: vec!["Drama".to_string()],
        });
        catalog.insert_rating(Rating { user_id: 1, movie_id: 1, score: 4.0 });
        catalog.insert_rating(Rating { user_id: 2, movie_id: 1, score: 2.0 });
        catalog
    }

    #[test]
    fn test_catalog_creation() {
        let catalog = Catalog::new();
        assert_eq!(catalog.counts(), (0, 0));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_two_movie_scenario() {
        let catalog = create_scenario_catalog();

        assert_eq!(catalog.average_rating(1), 3.0);
        assert_eq!(catalog.average_rating(2), 0.0);

        let found = catalog.movies_by_genre("com", DEFAULT_MOVIE_LIMIT);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0], catalog.get_movie(1).unwrap());
    }

    #[test]
    fn test_movie_json_field_names() {
        let catalog = create_scenario_catalog();
        let json = serde_json::to_value(catalog.get_movie(1).unwrap()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"MovieID": 1, "Title": "A", "Genres": ["Comedy"]})
        );
    }
}
