//! Route handlers.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::resilience::PolicySnapshot;
use crate::video::{SearchRequest, VideoListResult, VideoServiceError};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Query string of the trailer search route.
#[derive(Debug, Default, Deserialize)]
pub struct TrailerQuery {
    #[serde(default)]
    pub movie_name: String,
    pub page_size: Option<u32>,
    pub page_token: Option<String>,
    pub published_after: Option<DateTime<Utc>>,
    pub published_before: Option<DateTime<Utc>>,
}

impl From<TrailerQuery> for SearchRequest {
    fn from(query: TrailerQuery) -> Self {
        let mut request = SearchRequest::new(query.movie_name);
        if let Some(page_size) = query.page_size {
            request = request.with_page_size(page_size);
        }
        if let Some(token) = query.page_token {
            request = request.with_page_token(token);
        }
        request.published_after = query.published_after;
        request.published_before = query.published_before;
        request
    }
}

pub async fn get_trailers(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<TrailerQuery>, QueryRejection>,
) -> Result<Json<VideoListResult>, VideoServiceError> {
    let Query(query) =
        query.map_err(|rejection| VideoServiceError::InvalidRequest(rejection.body_text()))?;
    let request = SearchRequest::from(query);

    tracing::debug!(
        request_id = %request_id(&headers),
        movie = %request.movie_name,
        page_size = request.page_size,
        "Searching trailers"
    );

    let page = state.client.get_trailers(&request).await?;
    Ok(Json(page))
}

pub async fn get_resilience(State(state): State<AppState>) -> Json<PolicySnapshot> {
    Json(state.client.policy_snapshot())
}
