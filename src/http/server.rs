//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, request timeout)
//! - Serve on a bound listener until shutdown is signalled

use axum::{body::Body, http::Request, routing::get, Router};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::handlers;
use crate::http::request::{request_id, UuidRequestId, X_REQUEST_ID};
use crate::video::YoutubeVideoClient;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: YoutubeVideoClient,
}

/// HTTP front end for the trailer search client.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving `client`.
    pub fn new(config: ServiceConfig, client: YoutubeVideoClient) -> Self {
        let state = AppState { client };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/api/v1/videos/trailers", get(handlers::get_trailers))
            .route("/api/v1/resilience", get(handlers::get_resilience))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request.headers()),
                )
            }))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
    }

    /// The router, for serving it elsewhere or driving it in tests.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.timeouts.request_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PolicyConfig, YoutubeVideoOptions};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn router() -> Router {
        let options = YoutubeVideoOptions {
            api_key: "test-key".to_string(),
            base_url: "http://127.0.0.1:9/youtube/v3".to_string(),
            ..YoutubeVideoOptions::default()
        };
        let client = YoutubeVideoClient::new(options, &PolicyConfig::default()).unwrap();
        HttpServer::new(ServiceConfig::default(), client).into_router()
    }

    #[tokio::test]
    async fn test_generates_request_id() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let id = response.headers()[X_REQUEST_ID].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn test_empty_movie_name_is_rejected_before_provider() {
        let response = router()
            .oneshot(
                Request::get("/api/v1/videos/trailers?movie_name=")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = router()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
