//! HTTP gateway in front of the server's HTTP facade.
//!
//! `GET /recommend?genre=<g>` is forwarded to `<upstream>/movies?genre=<g>`
//! and the upstream status and body are passed through unchanged.

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8081";
pub const DEFAULT_UPSTREAM: &str = "http://127.0.0.1:8082";

#[derive(Clone, Debug)]
pub struct GatewayState {
    client: reqwest::Client,
    upstream: String,
}

impl GatewayState {
    pub fn new(upstream: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            upstream: upstream.into(),
        }
    }

    fn movies_url(&self) -> String {
        format!("{}/movies", self.upstream.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
pub struct GenreQuery {
    genre: Option<String>,
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/recommend", get(recommend_handler))
        .with_state(state)
}

/// Serve the gateway until Ctrl-C
pub async fn run(listen: &str, upstream: &str) -> Result<()> {
    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind gateway on {}", listen))?;
    info!(
        "Gateway listening on {}, forwarding to {}",
        listener.local_addr()?,
        upstream
    );

    axum::serve(listener, router(GatewayState::new(upstream)))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}

async fn recommend_handler(
    State(state): State<GatewayState>,
    Query(query): Query<GenreQuery>,
) -> Result<Response, AppError> {
    let genre = query
        .genre
        .filter(|genre| !genre.is_empty())
        .ok_or_else(AppError::missing_genre)?;

    let url = state.movies_url();
    debug!(%url, %genre, "Forwarding recommendation request");

    let response = state
        .client
        .get(url)
        .query(&[("genre", genre.as_str())])
        .send()
        .await
        .map_err(AppError::upstream)?;
    let status = response.status();
    let body = response.bytes().await.map_err(AppError::upstream)?;

    Ok((status, [(header::CONTENT_TYPE, "application/json")], body).into_response())
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

    fn upstream(err: impl std::fmt::Display) -> Self {
        warn!("Upstream request failed: {}", err);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "failed to fetch movies from the server".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use catalog::{Catalog, Movie};
    use std::collections::HashMap;
    use tower::ServiceExt;

    async fn spawn(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await });
        format!("http://{}", addr)
    }

    /// Upstream that echoes the genre it received
    async fn echo_upstream() -> String {
        let router = Router::new().route(
            "/movies",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let genre = params.get("genre").cloned().unwrap_or_default();
                let status = if genre == "teapot" {
                    StatusCode::IM_A_TEAPOT
                } else {
                    StatusCode::OK
                };
                (status, format!("{{\"genre\":{:?}}}", genre))
            }),
        );
        spawn(router).await
    }

    async fn get_recommend(upstream: &str, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = router(GatewayState::new(upstream))
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_forwards_genre_and_body() {
        let upstream = echo_upstream().await;
        let (status, content_type, body) = get_recommend(&upstream, "/recommend?genre=Drama").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(body, r#"{"genre":"Drama"}"#);
    }

    #[tokio::test]
    async fn test_genre_is_encoded_for_upstream() {
        let upstream = echo_upstream().await;
        let (_, _, body) =
            get_recommend(&upstream, "/recommend?genre=Sci-Fi%20%26%20Fantasy").await;

        assert_eq!(body, r#"{"genre":"Sci-Fi & Fantasy"}"#);
    }

    #[tokio::test]
    async fn test_upstream_status_passes_through() {
        let upstream = echo_upstream().await;
        let (status, _, _) = get_recommend(&upstream, "/recommend?genre=teapot").await;

        assert_eq!(status, StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn test_missing_genre_is_bad_request() {
        let upstream = echo_upstream().await;

        let (status, _, _) = get_recommend(&upstream, "/recommend").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, body) = get_recommend(&upstream, "/recommend?genre=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("genre"));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_server_error() {
        let probe = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let upstream = format!("http://{}", probe.local_addr().unwrap());
        drop(probe);

        let (status, _, body) = get_recommend(&upstream, "/recommend?genre=Drama").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("error"));
    }

    #[tokio::test]
    async fn test_against_server_facade() {
        let mut catalog = Catalog::new();
        catalog.insert_movie(Movie {
            id: 1,
            title: "Toy Story (1995)".to_string(),
            genres: vec!["Animation".to_string(), "Comedy".to_string()],
        });
        let upstream = spawn(server::http::router(server::AppState::new(catalog))).await;

        let (status, _, body) = get_recommend(&upstream, "/recommend?genre=anim").await;
        assert_eq!(status, StatusCode::OK);
        let movies: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(movies[0]["Title"], "Toy Story (1995)");

        let (status, _, _) = get_recommend(&upstream, "/recommend?genre=Western").await;
        assert_eq!(status, StatusCode::OK);
    }
}
