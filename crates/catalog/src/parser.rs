//! Parser for the movie and rating CSV tables.
//!
//! Both tables start with a header row:
//! - movies.csv: movieId,title,genres
//! - ratings.csv: userId,movieId,rating[,timestamp]
//!
//! Titles may be quoted and contain commas: `2,"American President, The (1995)",Comedy|Drama`.
//! Genres are pipe-separated: `Animation|Children|Comedy`.
//!
//! Records are handed to a sink one at a time instead of being collected, so
//! a failure halfway through a file leaves the earlier records in place.

use crate::error::{DataLoadError, Result};
use crate::types::{Movie, MovieId, Rating};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;

const MOVIE_FIELDS: usize = 3;
const RATING_FIELDS: usize = 3;

/// Parse a movies table, calling `sink` for every record.
///
/// Returns the number of records delivered. A malformed movie id stops the
/// parse with `ParseError`.
pub fn read_movies<R: Read>(reader: R, file: &str, mut sink: impl FnMut(Movie)) -> Result<usize> {
    let mut count = 0;
    for_each_record(reader, file, |line, record| {
        ensure_fields(record, MOVIE_FIELDS, line)?;

        let raw_id = record[0].trim();
        let id: MovieId = raw_id.parse().map_err(|e| DataLoadError::ParseError {
            file: file.to_string(),
            line,
            reason: format!("Invalid movieId {:?}: {}", raw_id, e),
        })?;
        if id == 0 {
            return Err(DataLoadError::ParseError {
                file: file.to_string(),
                line,
                reason: "movieId must be positive".to_string(),
            });
        }

        sink(Movie {
            id,
            title: record[1].to_string(),
            genres: parse_genres(&record[2]),
        });
        count += 1;
        Ok(())
    })?;
    Ok(count)
}

/// Parse a ratings table, calling `sink` for every record.
///
/// Malformed numeric fields become zero rather than failing the load.
pub fn read_ratings<R: Read>(reader: R, file: &str, mut sink: impl FnMut(Rating)) -> Result<usize> {
    let mut count = 0;
    for_each_record(reader, file, |line, record| {
        ensure_fields(record, RATING_FIELDS, line)?;

        sink(Rating {
            user_id: record[0].trim().parse().unwrap_or(0),
            movie_id: record[1].trim().parse().unwrap_or(0),
            score: parse_score(&record[2]),
        });
        count += 1;
        Ok(())
    })?;
    Ok(count)
}

/// Drive the CSV reader: validate the header, then hand each data record and
/// its 1-based line number to `f`.
fn for_each_record<R: Read>(
    reader: R,
    file: &str,
    mut f: impl FnMut(usize, &StringRecord) -> Result<()>,
) -> Result<()> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header_ok = csv_reader
        .headers()
        .map_err(|source| csv_error(file, source))?
        .iter()
        .any(|h| !h.trim().is_empty());
    if !header_ok {
        return Err(DataLoadError::MissingHeader {
            file: file.to_string(),
        });
    }

    let mut record = StringRecord::new();
    loop {
        let more = csv_reader
            .read_record(&mut record)
            .map_err(|source| csv_error(file, source))?;
        if !more {
            break;
        }
        // Blank lines are skipped by the csv reader; a lone empty field is not
        if record.len() == 1 && record[0].trim().is_empty() {
            continue;
        }
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        f(line, &record)?;
    }
    Ok(())
}

fn csv_error(file: &str, source: csv::Error) -> DataLoadError {
    DataLoadError::Csv {
        file: file.to_string(),
        source,
    }
}

fn ensure_fields(record: &StringRecord, expected: usize, line: usize) -> Result<()> {
    if record.len() < expected {
        return Err(DataLoadError::FieldCountMismatch {
            expected,
            found: record.len(),
            line,
        });
    }
    Ok(())
}

/// Split a pipe-separated genre list, trimming each label
///
/// Example: "Action|Adventure|Sci-Fi" -> ["Action", "Adventure", "Sci-Fi"]
fn parse_genres(s: &str) -> Vec<String> {
    s.split('|').map(|g| g.trim().to_string()).collect()
}

/// Scores that do not parse to a finite number count as zero
fn parse_score(s: &str) -> f64 {
    match s.trim().parse::<f64>() {
        Ok(score) if score.is_finite() => score,
        _ => 0.0,
    }
}
