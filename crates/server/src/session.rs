//! # Session Handler
//!
//! One `Session` per accepted connection. It reads client lines, drives the
//! catalog and the combined store, and writes responses back.
//!
//! ## States
//! - `AwaitCommand`: waiting for the next client line
//! - `GenreListing`: writing the genre menu for `GET_GENRES`
//! - `GenreTask`: computing and streaming results for `TASK_GENRE:<genre>`
//! - `Closed`: the client hung up, or the one-shot `GET_GENRES` finished
//!
//! Write failures end the session; nothing is retried.

use std::time::Instant;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter, Lines};
use tracing::{debug, instrument, warn};

use catalog::{DEFAULT_GENRE_LIMIT, DEFAULT_MOVIE_LIMIT};

use crate::protocol::{self, Command};
use crate::state::AppState;
use crate::store::DEFAULT_COMBINED_LIMIT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    AwaitCommand,
    GenreListing,
    GenreTask,
    Closed,
}

pub struct Session<R, W> {
    lines: Lines<BufReader<R>>,
    writer: BufWriter<W>,
    app: AppState,
    state: SessionState,
}

impl<R, W> Session<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, app: AppState) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            writer: BufWriter::new(writer),
            app,
            state: SessionState::AwaitCommand,
        }
    }

    /// Run the protocol until the client disconnects or the session closes
    /// itself. Returns an error only for I/O failures.
    pub async fn run(mut self) -> Result<()> {
        self.write_line(protocol::WELCOME).await?;
        self.flush().await?;

        while self.state != SessionState::Closed {
            let Some(line) = self.lines.next_line().await.context("Reading client line")? else {
                debug!("Client closed the connection");
                self.state = SessionState::Closed;
                break;
            };
            self.handle(Command::parse(&line)).await?;
            self.flush().await?;
        }
        Ok(())
    }

    async fn handle(&mut self, command: Command) -> Result<()> {
        match command {
            Command::UserId(user_id) => {
                // Accepted for compatibility; results are not personalized
                debug!(user_id, "Client identified");
                let (movies, ratings) = self.app.catalog.counts();
                self.write_line(&protocol::confirmation(movies, ratings)).await?;
                self.send_genre_menu().await?;
            }
            Command::GetGenres => {
                self.state = SessionState::GenreListing;
                self.send_genre_menu().await?;
                self.state = SessionState::Closed;
            }
            Command::TaskGenre(genre) => {
                self.state = SessionState::GenreTask;
                self.run_genre_task(genre).await?;
                self.state = SessionState::AwaitCommand;
            }
            Command::Combined(genre) => self.send_combined(&genre).await?,
            Command::Unknown(line) => {
                warn!(line = %line, "Unrecognized command");
                self.write_line(protocol::UNRECOGNIZED_COMMAND).await?;
            }
        }
        Ok(())
    }

    /// Genre counting runs on a blocking worker, like the genre task
    async fn send_genre_menu(&mut self) -> Result<()> {
        let catalog = self.app.catalog.clone();
        let genres = tokio::task::spawn_blocking(move || catalog.top_genres(DEFAULT_GENRE_LIMIT))
            .await
            .context("Genre menu panicked")?;
        self.write_line(protocol::GENRE_INSTRUCTION).await?;
        for genre in &genres {
            self.write_line(genre).await?;
        }
        self.write_line(protocol::END_OF_GENRES).await
    }

    /// Filter, merge and score on a blocking worker, then stream the lines.
    ///
    /// The store lock is only held inside the worker, never while writing.
    #[instrument(skip(self))]
    async fn run_genre_task(&mut self, genre: String) -> Result<()> {
        let start = Instant::now();
        let app = self.app.clone();

        let lines = tokio::task::spawn_blocking(move || {
            let catalog = &*app.catalog;
            let movies = catalog.movies_by_genre(&genre, DEFAULT_MOVIE_LIMIT);
            app.store.merge(&genre, movies.iter().copied(), catalog);
            movies
                .iter()
                .map(|movie| protocol::recommendation_line(&movie.title, catalog.average_rating(movie.id)))
                .collect::<Vec<_>>()
        })
        .await
        .context("Genre task panicked")?;

        debug!(results = lines.len(), elapsed = ?start.elapsed(), "Genre task finished");
        for line in &lines {
            self.write_line(line).await?;
        }
        self.write_line(protocol::END_OF_RESULTS).await
    }

    async fn send_combined(&mut self, genre: &str) -> Result<()> {
        match self.app.store.top_combined(genre, DEFAULT_COMBINED_LIMIT) {
            Some(entries) => {
                self.write_line(&protocol::combined_header(genre)).await?;
                for (idx, rec) in entries.iter().enumerate() {
                    let line = protocol::combined_line(idx + 1, &rec.title, &rec.genres, rec.avg_rating);
                    self.write_line(&line).await?;
                }
            }
            None => self.write_line(protocol::NO_COMBINED_RECOMMENDATIONS).await?,
        }
        self.write_line(protocol::END_OF_RESULTS).await
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes()).await.context("Writing to client")?;
        self.writer.write_all(b"\n").await.context("Writing to client")?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await.context("Flushing to client")
    }
}
