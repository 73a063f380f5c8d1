//! HTTP facade over the catalog and the combined store.
//!
//! - `GET /movies?genre=<g>`: movies matching the genre, as JSON
//! - `GET /combined?genre=<g>`: combined recommendations collected for the genre

use anyhow::Result;
use axum::Json;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::info;

use catalog::{DEFAULT_MOVIE_LIMIT, Movie};

use crate::state::AppState;
use crate::store::{DEFAULT_COMBINED_LIMIT, Recommendation};

#[derive(Debug, Deserialize)]
pub struct GenreQuery {
    genre: Option<String>,
}

impl GenreQuery {
    /// The requested genre; absent or empty is a client error
    fn genre(self) -> Result<String, AppError> {
        match self.genre {
            Some(genre) if !genre.is_empty() => Ok(genre),
            _ => Err(AppError::missing_genre()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/movies", get(movies_handler))
        .route("/combined", get(combined_handler))
        .with_state(state)
}

/// Serve the facade until the listener fails
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    info!("HTTP facade listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn movies_handler(
    State(state): State<AppState>,
    Query(query): Query<GenreQuery>,
) -> Result<Json<Vec<Movie>>, AppError> {
    let genre = query.genre()?;
    let movies = state
        .catalog
        .movies_by_genre(&genre, DEFAULT_MOVIE_LIMIT)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(movies))
}

async fn combined_handler(
    State(state): State<AppState>,
    Query(query): Query<GenreQuery>,
) -> Result<Json<Vec<Recommendation>>, AppError> {
    let genre = query.genre()?;
    state
        .store
        .top_combined(&genre, DEFAULT_COMBINED_LIMIT)
        .map(Json)
        .ok_or_else(|| AppError::no_recommendations(&genre))
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn missing_genre() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "the genre query parameter is required".to_string(),
        }
    }

    fn no_recommendations(genre: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("no recommendations found for genre {genre}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}
