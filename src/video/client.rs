//! YouTube Data API search client.
//!
//! # Responsibilities
//! - Translate a [`SearchRequest`] into a `search.list` query
//! - Run every outbound call through the shared resilience pipeline
//! - Map provider items into normalized [`Video`](crate::video::Video) records

use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

use crate::config::{PolicyConfig, YoutubeVideoOptions};
use crate::observability::metrics;
use crate::resilience::{PolicySnapshot, ResiliencePolicy};
use crate::video::error::{ProviderError, VideoServiceError};
use crate::video::types::{SearchListResponse, SearchRequest, VideoListResult};

/// Name the pipeline reports in logs and metrics.
const POLICY_NAME: &str = "youtube";

/// Trailer search client backed by the YouTube Data API.
///
/// Cheap to clone; clones share the HTTP connection pool and the resilience
/// state, so the breaker and bulkhead see every call made by any clone.
#[derive(Debug, Clone)]
pub struct YoutubeVideoClient {
    http: reqwest::Client,
    options: Arc<YoutubeVideoOptions>,
    search_url: Url,
    policy: Arc<ResiliencePolicy>,
}

impl YoutubeVideoClient {
    /// Build a client from provider options and policy settings.
    pub fn new(options: YoutubeVideoOptions, policy: &PolicyConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .user_agent(options.application_name.clone())
            .build()?;
        Self::with_http_client(http, options, policy)
    }

    /// Build a client on top of an existing HTTP client.
    pub fn with_http_client(
        http: reqwest::Client,
        options: YoutubeVideoOptions,
        policy: &PolicyConfig,
    ) -> Result<Self, ProviderError> {
        let search_url = search_endpoint(&options.base_url)?;

        tracing::info!(
            endpoint = %search_url,
            retry_count = policy.retry_count,
            timeout_ms = policy.timeout_ms,
            max_parallel = policy.max_parallel,
            max_queued = policy.max_queued,
            "Video search client initialized"
        );

        Ok(Self {
            http,
            options: Arc::new(options),
            search_url,
            policy: Arc::new(ResiliencePolicy::from_config(POLICY_NAME, policy)),
        })
    }

    /// Search for trailers matching `request`.
    ///
    /// Each attempt is bounded by the policy timeout; the whole call may take up
    /// to `retry_count + 1` attempts.
    pub async fn get_trailers(
        &self,
        request: &SearchRequest,
    ) -> Result<VideoListResult, VideoServiceError> {
        let start = Instant::now();
        let result = self.search(request).await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(err) => err.kind(),
        };
        metrics::record_search(outcome, start);

        match &result {
            Ok(page) => tracing::debug!(
                movie = %request.movie_name,
                items = page.items.len(),
                total = page.total_results,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Trailer search completed"
            ),
            Err(err) => tracing::warn!(
                movie = %request.movie_name,
                error = %err,
                kind = err.kind(),
                "Trailer search failed"
            ),
        }
        result
    }

    async fn search(&self, request: &SearchRequest) -> Result<VideoListResult, VideoServiceError> {
        request.validate()?;
        let url = self.search_query(request);

        let response = self
            .policy
            .execute(|| fetch(self.http.clone(), url.clone()))
            .await?;

        Ok(VideoListResult::from_response(response, &request.page_token))
    }

    /// Build the outbound `search.list` URL for `request`.
    pub(crate) fn search_query(&self, request: &SearchRequest) -> Url {
        let options = &self.options;
        let mut url = self.search_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("key", &options.api_key)
                .append_pair("part", &options.search_part)
                .append_pair("q", &request.search_term())
                .append_pair("maxResults", &request.page_size.to_string())
                .append_pair("order", &options.order)
                .append_pair("type", &options.search_type)
                .append_pair("videoEmbeddable", "true");
            if !request.page_token.is_empty() {
                query.append_pair("pageToken", &request.page_token);
            }
            if let Some(after) = request.published_after {
                query.append_pair("publishedAfter", &after.to_rfc3339());
            }
            if let Some(before) = request.published_before {
                query.append_pair("publishedBefore", &before.to_rfc3339());
            }
        }
        url
    }

    /// Current state of the resilience pipeline.
    pub fn policy_snapshot(&self) -> PolicySnapshot {
        self.policy.snapshot()
    }
}

fn search_endpoint(base_url: &str) -> Result<Url, ProviderError> {
    let base = Url::parse(base_url.trim_end_matches('/'))
        .map_err(|e| ProviderError::Configuration(format!("invalid base URL '{}': {}", base_url, e)))?;
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ProviderError::Configuration(format!("base URL '{}' cannot have a path", base)))?
        .pop_if_empty()
        .push("search");
    Ok(url)
}

/// One outbound attempt.
async fn fetch(http: reqwest::Client, url: Url) -> Result<SearchListResponse, ProviderError> {
    let response = http.get(url).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }
    Ok(serde_json::from_str(&body)?)
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Extract the provider's error message, falling back to the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.chars().take(256).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    fn client(base_url: &str) -> YoutubeVideoClient {
        let options = YoutubeVideoOptions {
            api_key: "secret".to_string(),
            base_url: base_url.to_string(),
            ..YoutubeVideoOptions::default()
        };
        YoutubeVideoClient::new(options, &PolicyConfig::default()).unwrap()
    }

    fn params(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    #[test]
    fn test_search_endpoint() {
        let url = search_endpoint("https://www.googleapis.com/youtube/v3").unwrap();
        assert_eq!(url.as_str(), "https://www.googleapis.com/youtube/v3/search");

        let url = search_endpoint("http://127.0.0.1:8081/").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8081/search");

        assert!(search_endpoint("not a url").is_err());
    }

    #[test]
    fn test_first_page_query() {
        let client = client("https://www.googleapis.com/youtube/v3");
        let url = client.search_query(&SearchRequest::new("Inception"));
        let params = params(&url);

        assert_eq!(url.path(), "/youtube/v3/search");
        assert_eq!(params["key"], "secret");
        assert_eq!(params["part"], "snippet");
        assert_eq!(params["q"], "inception trailer");
        assert_eq!(params["maxResults"], "20");
        assert_eq!(params["order"], "relevance");
        assert_eq!(params["type"], "video");
        assert_eq!(params["videoEmbeddable"], "true");
        assert!(!params.contains_key("pageToken"));
        assert!(!params.contains_key("publishedAfter"));
    }

    #[test]
    fn test_optional_query_params() {
        let client = client("https://www.googleapis.com/youtube/v3");
        let request = SearchRequest::new("Dune Trailer")
            .with_page_size(5)
            .with_page_token("CAUQAA")
            .published_after(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap());
        let params = params(&client.search_query(&request));

        assert_eq!(params["q"], "dune trailer");
        assert_eq!(params["maxResults"], "5");
        assert_eq!(params["pageToken"], "CAUQAA");
        assert_eq!(params["publishedAfter"], "2021-01-01T00:00:00+00:00");
        assert!(!params.contains_key("publishedBefore"));
    }

    #[test]
    fn test_error_message_extraction() {
        let body = r#"{"error":{"code":403,"message":"quota exceeded"}}"#;
        assert_eq!(error_message(body), "quota exceeded");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_invalid_request_makes_no_call() {
        let client = client("http://127.0.0.1:9");
        let err = client.get_trailers(&SearchRequest::new("")).await.unwrap_err();
        assert!(matches!(err, VideoServiceError::InvalidRequest(_)));
        assert_eq!(client.policy_snapshot().consecutive_failures, 0);
    }
}
