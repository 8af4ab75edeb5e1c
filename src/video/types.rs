//! Search request, normalized result types and provider wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::video::error::VideoServiceError;

/// Keyword every search is biased towards.
pub const TRAILER_MARKER: &str = "trailer";

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Lower-case the movie name and append the marker keyword unless present.
pub fn normalize_search_term(movie_name: &str) -> String {
    let term = movie_name.to_lowercase();
    if term.contains(TRAILER_MARKER) {
        term
    } else {
        format!("{} {}", term, TRAILER_MARKER)
    }
}

/// A trailer search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub movie_name: String,
    pub page_size: u32,
    /// Opaque provider token; empty for the first page.
    pub page_token: String,
    pub published_after: Option<DateTime<Utc>>,
    pub published_before: Option<DateTime<Utc>>,
}

impl SearchRequest {
    pub fn new(movie_name: impl Into<String>) -> Self {
        Self {
            movie_name: movie_name.into(),
            page_size: DEFAULT_PAGE_SIZE,
            page_token: String::new(),
            published_after: None,
            published_before: None,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_page_token(mut self, page_token: impl Into<String>) -> Self {
        self.page_token = page_token.into();
        self
    }

    pub fn published_after(mut self, after: DateTime<Utc>) -> Self {
        self.published_after = Some(after);
        self
    }

    pub fn published_before(mut self, before: DateTime<Utc>) -> Self {
        self.published_before = Some(before);
        self
    }

    /// Check the request invariants.
    pub fn validate(&self) -> Result<(), VideoServiceError> {
        if self.movie_name.trim().is_empty() {
            return Err(VideoServiceError::InvalidRequest(
                "movie name must not be empty".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(VideoServiceError::InvalidRequest(
                "page size must be greater than zero".to_string(),
            ));
        }
        if let (Some(after), Some(before)) = (self.published_after, self.published_before) {
            if after > before {
                return Err(VideoServiceError::InvalidRequest(format!(
                    "published_after ({}) is later than published_before ({})",
                    after.to_rfc3339(),
                    before.to_rfc3339()
                )));
            }
        }
        Ok(())
    }

    /// The term sent to the provider.
    pub fn search_term(&self) -> String {
        normalize_search_term(&self.movie_name)
    }
}

/// A normalized video record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    /// Provider key used to build embed/watch URLs.
    pub key: String,
    pub name: String,
    pub iso_639_1: String,
    pub iso_3166_1: String,
    /// Vertical resolution hint.
    pub size: u32,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// One page of videos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoListResult {
    pub items: Vec<Video>,
    pub total_results: u64,
    pub page_token: String,
    pub next_page_token: Option<String>,
    pub prev_page_token: Option<String>,
    /// Page size the provider reported; zero when it reported none.
    pub results_per_page: u32,
}

impl VideoListResult {
    pub(crate) fn from_response(response: SearchListResponse, page_token: &str) -> Self {
        let items: Vec<Video> = response.items.into_iter().map(Video::from).collect();
        let page_info = response.page_info.unwrap_or_default();

        Self {
            results_per_page: page_info.results_per_page.unwrap_or(0),
            total_results: page_info.total_results.unwrap_or(0),
            page_token: page_token.to_string(),
            next_page_token: response.next_page_token,
            prev_page_token: response.prev_page_token,
            items,
        }
    }
}

impl From<SearchResult> for Video {
    fn from(result: SearchResult) -> Self {
        let video_id = result.id.video_id.unwrap_or_default();
        let snippet = result.snippet.unwrap_or_default();
        Self {
            id: video_id.clone(),
            key: video_id,
            name: snippet.title.unwrap_or_default(),
            iso_639_1: "en".to_string(),
            iso_3166_1: "US".to_string(),
            size: 1080,
            site: "YouTube".to_string(),
            video_type: "Trailer".to_string(),
            published_at: snippet.published_at,
        }
    }
}

/// `search.list` response body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
    pub next_page_token: Option<String>,
    pub prev_page_token: Option<String>,
    pub page_info: Option<PageInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageInfo {
    pub total_results: Option<u64>,
    pub results_per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResult {
    #[serde(default)]
    pub id: ResourceId,
    pub snippet: Option<Snippet>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResourceId {
    pub video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Snippet {
    pub title: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}
