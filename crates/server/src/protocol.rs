//! Line protocol spoken over the TCP listener.
//!
//! Every message is one newline-terminated UTF-8 line. A typical exchange:
//!
//! ```text
//! S: Welcome to the movie recommendation server
//! C: 42
//! S: Catalog loaded: 9742 movies, 100836 ratings
//! S: Please choose a genre from the following list:
//! S: Drama
//! S: Comedy
//! S: [END_OF_GENRES]
//! C: TASK_GENRE:Comedy
//! S: Toy Story (1995), Average Rating: 3.92
//! S: Jumanji (1995), Average Rating: 3.43
//! S:
//! ```

use catalog::UserId;

pub const WELCOME: &str = "Welcome to the movie recommendation server";
pub const GENRE_INSTRUCTION: &str = "Please choose a genre from the following list:";
pub const END_OF_GENRES: &str = "[END_OF_GENRES]";
pub const UNRECOGNIZED_COMMAND: &str = "Unrecognized command";
pub const NO_COMBINED_RECOMMENDATIONS: &str = "No recommendations found for the selected genre.";

/// Terminates a streamed list of recommendations
pub const END_OF_RESULTS: &str = "";

pub const GET_GENRES: &str = "GET_GENRES";
pub const TASK_GENRE_PREFIX: &str = "TASK_GENRE:";
pub const COMBINED_PREFIX: &str = "COMBINED:";

/// A parsed client line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Handshake: the client identifies itself. The id does not change the
    /// results; it only triggers the confirmation and the genre menu.
    UserId(UserId),
    /// One-shot genre menu; the connection closes afterwards
    GetGenres,
    /// Recommend movies for a genre and merge them into the combined store
    TaskGenre(String),
    /// Show the combined recommendations collected for a genre
    Combined(String),
    Unknown(String),
}

impl Command {
    /// Parse one line, ignoring surrounding whitespace.
    ///
    /// Keywords match by prefix, so `GET_GENRES please` is still `GetGenres`.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.starts_with(GET_GENRES) {
            Command::GetGenres
        } else if let Some(genre) = line.strip_prefix(TASK_GENRE_PREFIX) {
            Command::TaskGenre(genre.to_string())
        } else if let Some(genre) = line.strip_prefix(COMBINED_PREFIX) {
            Command::Combined(genre.to_string())
        } else if let Ok(user_id) = line.parse::<UserId>() {
            Command::UserId(user_id)
        } else {
            Command::Unknown(line.to_string())
        }
    }
}

pub fn confirmation(movies: usize, ratings: usize) -> String {
    format!("Catalog loaded: {} movies, {} ratings", movies, ratings)
}

/// One streamed result of a genre task
pub fn recommendation_line(title: &str, avg_rating: f64) -> String {
    format!("{}, Average Rating: {:.2}", title, avg_rating)
}

pub fn combined_header(genre: &str) -> String {
    format!("Combined recommendations for genre: {}", genre)
}

/// `rank` is 1-based
pub fn combined_line(rank: usize, title: &str, genres: &[String], avg_rating: f64) -> String {
    format!(
        "{}. {}, Genres: {}, Combined Average Rating: {:.2}",
        rank,
        title,
        genres.join(", "),
        avg_rating
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("GET_GENRES\n"), Command::GetGenres);
        assert_eq!(
            Command::parse("TASK_GENRE:Sci-Fi\r\n"),
            Command::TaskGenre("Sci-Fi".to_string())
        );
        assert_eq!(
            Command::parse("COMBINED:Drama"),
            Command::Combined("Drama".to_string())
        );
        assert_eq!(Command::parse(" 17 "), Command::UserId(17));
        assert_eq!(Command::parse("-7"), Command::UserId(-7));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            Command::parse("HELLO"),
            Command::Unknown("HELLO".to_string())
        );
        assert_eq!(Command::parse("task_genre:Drama"), Command::Unknown("task_genre:Drama".to_string()));
        assert_eq!(Command::parse("1.5"), Command::Unknown("1.5".to_string()));
    }

    #[test]
    fn test_empty_task_genre_keeps_empty_query() {
        assert_eq!(
            Command::parse("TASK_GENRE:"),
            Command::TaskGenre(String::new())
        );
    }

    #[test]
    fn test_result_lines() {
        assert_eq!(recommendation_line("B", 0.0), "B, Average Rating: 0.00");
        assert_eq!(recommendation_line("A", 10.0 / 3.0), "A, Average Rating: 3.33");
        assert_eq!(
            combined_line(1, "A", &["Comedy".to_string(), "Drama".to_string()], 3.0),
            "1. A, Genres: Comedy, Drama, Combined Average Rating: 3.00"
        );
    }
}
