//! Interactive client for the line protocol.
//!
//! [`ProtocolClient`] speaks the protocol over any reader/writer pair;
//! [`run`] wires it to a TCP connection and the terminal.

use std::io::Write;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin,
};
use tokio::net::TcpStream;
use tracing::info;

use catalog::UserId;
use server::protocol::{END_OF_GENRES, END_OF_RESULTS, TASK_GENRE_PREFIX};

use crate::retry::{connect_with_retry, RetryPolicy, TokioSleeper};

/// The genre menu as the server sent it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreMenu {
    pub instruction: String,
    pub genres: Vec<String>,
}

pub struct ProtocolClient<R, W> {
    lines: Lines<BufReader<R>>,
    writer: W,
}

impl<R, W> ProtocolClient<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    pub async fn read_welcome(&mut self) -> Result<String> {
        self.read_line().await
    }

    /// Identify to the server; returns its confirmation line
    pub async fn send_user_id(&mut self, user_id: UserId) -> Result<String> {
        self.send(&user_id.to_string()).await?;
        self.read_line().await
    }

    /// Read the instruction and genre lines up to the end-of-genres sentinel
    pub async fn read_genre_menu(&mut self) -> Result<GenreMenu> {
        let instruction = self.read_line().await?;
        let mut genres = Vec::new();
        loop {
            let line = self.read_line().await?;
            if line == END_OF_GENRES {
                break;
            }
            genres.push(line.trim().to_string());
        }
        Ok(GenreMenu {
            instruction,
            genres,
        })
    }

    /// Ask for recommendations; returns the lines before the blank terminator
    pub async fn request_genre(&mut self, genre: &str) -> Result<Vec<String>> {
        self.send(&format!("{}{}", TASK_GENRE_PREFIX, genre)).await?;

        let mut results = Vec::new();
        loop {
            let line = self.read_line().await?;
            if line == END_OF_RESULTS {
                break;
            }
            results.push(line);
        }
        Ok(results)
    }

    async fn send(&mut self, line: &str) -> Result<()> {
        self.writer
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .context("Writing to server")?;
        self.writer.flush().await.context("Flushing to server")
    }

    async fn read_line(&mut self) -> Result<String> {
        match self.lines.next_line().await.context("Reading from server")? {
            Some(line) => Ok(line),
            None => bail!("Server closed the connection"),
        }
    }
}

/// Map a 1-based menu choice to its genre
pub fn select_genre<'a>(input: &str, genres: &'a [String]) -> Option<&'a str> {
    let choice: usize = input.trim().parse().ok()?;
    genres.get(choice.checked_sub(1)?).map(String::as_str)
}

/// Connect (retrying per `policy`), then walk the user through one request
pub async fn run(addr: &str, policy: RetryPolicy) -> Result<()> {
    let stream = connect_with_retry(|| TcpStream::connect(addr), &policy, &TokioSleeper).await?;
    info!("Connected to {}", addr);

    let (reader, writer) = stream.into_split();
    let mut client = ProtocolClient::new(reader, writer);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", client.read_welcome().await?.bold().blue());

    let Some(answer) = prompt(&mut input, "Enter your user ID: ").await? else {
        return Ok(());
    };
    let Ok(user_id) = answer.trim().parse::<UserId>() else {
        println!("{}", "Invalid user ID".red());
        return Ok(());
    };
    println!("{}", client.send_user_id(user_id).await?);

    let menu = client.read_genre_menu().await?;
    println!("{}", menu.instruction);
    for (idx, genre) in menu.genres.iter().enumerate() {
        println!("{}. {}", (idx + 1).to_string().green(), genre);
    }

    let Some(answer) = prompt(&mut input, "Select a genre by number: ").await? else {
        return Ok(());
    };
    let Some(genre) = select_genre(&answer, &menu.genres) else {
        println!("{}", "Invalid selection".red());
        return Ok(());
    };

    let results = client.request_genre(genre).await?;
    println!("{}", "Recommended movies:".bold().blue());
    for line in &results {
        println!("  {}", line);
    }
    Ok(())
}

async fn prompt(input: &mut Lines<BufReader<Stdin>>, message: &str) -> Result<Option<String>> {
    print!("{}", message);
    std::io::stdout().flush()?;
    Ok(input.next_line().await?)
}
