//! Catalog loading.
//!
//! The movie and rating tables are independent, so `load_from_files` parses
//! them on two rayon workers. A failure in one table is logged and leaves
//! that part of the catalog empty or partial; the other table is unaffected.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::Catalog;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{error, info};

impl Catalog {
    /// Load both tables and return whatever could be read.
    ///
    /// Never fails: errors are reported through `tracing` and the affected
    /// table keeps the rows parsed before the failure.
    pub fn load_from_files(movies_path: &Path, ratings_path: &Path) -> Self {
        info!(
            "Loading catalog from {} and {}",
            movies_path.display(),
            ratings_path.display()
        );

        let ((movies, movies_result), (ratings, ratings_result)) = rayon::join(
            || {
                let mut part = Catalog::new();
                let result = part.load_movies(movies_path);
                (part, result)
            },
            || {
                let mut part = Catalog::new();
                let result = part.load_ratings(ratings_path);
                (part, result)
            },
        );

        if let Err(e) = movies_result {
            error!("Failed to load movies from {}: {}", movies_path.display(), e);
        }
        if let Err(e) = ratings_result {
            error!("Failed to load ratings from {}: {}", ratings_path.display(), e);
        }

        let catalog = Catalog {
            movies: movies.movies,
            ratings: ratings.ratings,
        };
        let (movie_count, rating_count) = catalog.counts();
        info!("Loaded {} movies, {} ratings", movie_count, rating_count);
        catalog
    }

    /// Add every movie in the file at `path` to the catalog.
    ///
    /// Not atomic: rows before a malformed one are kept.
    pub fn load_movies(&mut self, path: &Path) -> Result<usize> {
        let file = open(path)?;
        self.load_movies_from_reader(file, &file_name(path))
    }

    pub fn load_movies_from_reader<R: Read>(&mut self, reader: R, file: &str) -> Result<usize> {
        parser::read_movies(reader, file, |movie| self.insert_movie(movie))
    }

    /// Append every rating in the file at `path` to the catalog.
    pub fn load_ratings(&mut self, path: &Path) -> Result<usize> {
        let file = open(path)?;
        self.load_ratings_from_reader(file, &file_name(path))
    }

    pub fn load_ratings_from_reader<R: Read>(&mut self, reader: R, file: &str) -> Result<usize> {
        parser::read_ratings(reader, file, |rating| self.insert_rating(rating))
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    Ok(BufReader::new(file))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
