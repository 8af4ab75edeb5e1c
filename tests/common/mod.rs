//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use url::Url;

use movie_search::config::{PolicyConfig, YoutubeVideoOptions};
use movie_search::YoutubeVideoClient;

/// Base path the mock provider is mounted under.
pub const API_PREFIX: &str = "/youtube/v3";

/// What the mock backend saw for one request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: HashMap<String, String>,
}

/// Log of requests received by a mock backend.
#[derive(Debug, Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<RecordedRequest>>>);

impl RequestLog {
    pub fn push(&self, request: RecordedRequest) {
        self.0.lock().unwrap().push(request);
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn last(&self) -> RecordedRequest {
        self.0.lock().unwrap().last().cloned().expect("no request recorded")
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` is called once per request and returns the status and JSON body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(RecordedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut reader = BufReader::new(socket);
                        let mut request_line = String::new();
                        if reader.read_line(&mut request_line).await.is_err() {
                            return;
                        }
                        loop {
                            let mut line = String::new();
                            match reader.read_line(&mut line).await {
                                Ok(0) | Err(_) => break,
                                Ok(_) if line == "\r\n" => break,
                                Ok(_) => {}
                            }
                        }

                        let target = request_line.split_whitespace().nth(1).unwrap_or("/");
                        let url = Url::parse(&format!("http://backend{}", target)).unwrap();
                        let recorded = RecordedRequest {
                            path: url.path().to_string(),
                            query: url.query_pairs().into_owned().collect(),
                        };

                        let (status, body) = f(recorded).await;
                        let response = format!(
                            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            status_text(status),
                            body.len(),
                            body
                        );
                        let mut socket = reader.into_inner();
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Mock backend that records every request and answers with `f`.
pub async fn start_recording_backend<F>(f: F) -> (SocketAddr, RequestLog)
where
    F: Fn(usize) -> (u16, String) + Send + Sync + 'static,
{
    let log = RequestLog::default();
    let recorder = log.clone();
    let addr = start_programmable_backend(move |request| {
        recorder.push(request);
        let response = f(recorder.len() - 1);
        async move { response }
    })
    .await;
    (addr, log)
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// A `search.list` body with one item per id.
pub fn search_body(ids: &[&str], total_results: u64, next_page_token: Option<&str>) -> String {
    let items: Vec<_> = ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "kind": "youtube#searchResult",
                "id": { "kind": "youtube#video", "videoId": id },
                "snippet": {
                    "title": format!("Trailer {}", id),
                    "publishedAt": "2010-05-11T00:00:00Z"
                }
            })
        })
        .collect();

    let mut body = serde_json::json!({
        "kind": "youtube#searchListResponse",
        "pageInfo": { "totalResults": total_results, "resultsPerPage": ids.len() },
        "items": items,
    });
    if let Some(token) = next_page_token {
        body["nextPageToken"] = token.into();
    }
    body.to_string()
}

/// A provider error body.
pub fn error_body(code: u16, message: &str) -> String {
    serde_json::json!({ "error": { "code": code, "message": message } }).to_string()
}

pub fn policy(retry_count: u32, timeout_ms: u64, break_duration_ms: u64) -> PolicyConfig {
    PolicyConfig {
        retry_count,
        timeout_ms,
        break_duration_ms,
        ..PolicyConfig::default()
    }
}

/// A client pointed at a mock backend.
pub fn youtube_client(addr: SocketAddr, policy: &PolicyConfig) -> YoutubeVideoClient {
    let options = YoutubeVideoOptions {
        api_key: "test-key".to_string(),
        base_url: format!("http://{}{}", addr, API_PREFIX),
        ..YoutubeVideoOptions::default()
    };
    let http = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();
    YoutubeVideoClient::with_http_client(http, options, policy).unwrap()
}
