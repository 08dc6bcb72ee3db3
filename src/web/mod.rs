//! Dashboard Web Server
//!
//! HTTP layer for the dashboard, built with Axum.
//!
//! # Pages
//!
//! - `GET /samples` - Sample list
//! - `GET /search` - Metadata search
//! - `GET /samples/:sample_id` - Run detail
//!
//! # Health
//!
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe (backend reachable)
//! - `GET /health` - Full health status
//!
//! Every other path redirects to `/samples`.
//!
//! # Example
//!
//! ```rust,ignore
//! use ngs_dashboard::{ApiClient, AppState, Config, SampleQueries};
//! use std::sync::Arc;
//!
//! let config = Config::from_env();
//! let client = ApiClient::new(config.backend.clone())?;
//! let queries = Arc::new(SampleQueries::new(Arc::new(client), config.query.clone()));
//! let server = config.server.clone();
//! ngs_dashboard::web::serve(AppState::new(queries, config), &server).await?;
//! ```

pub mod error;
pub mod routes;
pub mod state;

pub use error::{WebError, WebResult};
pub use state::AppState;

use axum::{response::Redirect, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

/// Landing page; unknown paths are sent here
pub const HOME_PATH: &str = "/samples";

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let sample_routes = Router::new()
        .route("/", get(routes::samples::list_samples))
        .route("/:sample_id", get(routes::samples::sample_detail));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/samples", sample_routes)
        .route("/search", get(routes::samples::search_samples))
        .nest("/health", health_routes)
        .fallback(redirect_home)
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

async fn redirect_home() -> Redirect {
    Redirect::to(HOME_PATH)
}

/// Start the dashboard server
pub async fn serve(state: AppState, config: &ServerConfig) -> Result<(), WebError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Dashboard listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| WebError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Dashboard shut down gracefully");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::FakeSource;
    use crate::config::Config;
    use crate::model::{Run, RunMetadata, Sample};
    use crate::queries::SampleQueries;
    use crate::views::{run_detail, sample_list};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use std::sync::atomic::Ordering;
    use tower::util::ServiceExt;

    fn fixtures() -> Vec<Sample> {
        vec![
            Sample::new("S1", "aaaaaaaaaaaaaaaaaaaa").run(
                Run::new("R1", "WGS").metadata(
                    RunMetadata::default()
                        .coverage(vec![30.0, 32.0])
                        .quality(vec![35.0, 36.0])
                        .entry("instrument", "NovaSeq"),
                ),
            ),
            Sample::new("S2", "bbbbbbbbbbbbbbbbbbbb").run(Run::new("R2", "RNA-Seq")),
        ]
    }

    fn create_test_app() -> (Router, Arc<FakeSource>) {
        let source = Arc::new(FakeSource::new(fixtures()));
        let config = Config::default();
        let queries = Arc::new(SampleQueries::new(source.clone(), config.query.clone()));
        (build_router(AppState::new(queries, config)), source)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String, Option<String>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, String::from_utf8(bytes.to_vec()).unwrap(), location)
    }

    #[tokio::test]
    async fn test_list_page_links_every_sample() {
        let (app, _source) = create_test_app();
        let (status, body, _) = get(app, "/samples").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.matches("<tr class=\"sample\">").count(), 2);
        assert!(body.contains("href=\"/samples/S1\""));
        assert!(body.contains("href=\"/samples/S2\""));
        assert!(body.contains("http-equiv=\"refresh\" content=\"10\""));
    }

    #[tokio::test]
    async fn test_list_page_filter_and_paging() {
        let (app, source) = create_test_app();
        let (status, body, _) = get(app, "/samples?skip=0&limit=1&assay_type=RNA-Seq").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.matches("<tr class=\"sample\">").count(), 1);
        assert!(body.contains("href=\"/samples/S2\""));
        assert!(body.contains("rel=\"next\""));
        assert_eq!(source.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_list_page_backend_down() {
        let (app, source) = create_test_app();
        source.set_failing(true);
        let (status, body, _) = get(app, "/samples").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(sample_list::ERROR_TEXT));
        assert!(!body.contains("<table"));
    }

    #[tokio::test]
    async fn test_detail_page() {
        let (app, _source) = create_test_app();
        let (status, body, _) = get(app, "/samples/S1").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Analysis: S1"));
        assert!(body.contains("<dt>instrument</dt><dd>NovaSeq</dd>"));
        assert!(body.contains("data-chart-option="));
        assert!(!body.contains("<dt>coverage"));
    }

    #[tokio::test]
    async fn test_detail_page_unknown_sample() {
        let (app, _source) = create_test_app();
        let (status, body, _) = get(app, "/samples/NOPE").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(run_detail::ERROR_TEXT));
        assert!(!body.contains("Analysis:"));
    }

    #[tokio::test]
    async fn test_search_page() {
        let (app, source) = create_test_app();
        let (status, body, _) = get(app, "/search?key=instrument&value=NovaSeq").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.matches("<tr class=\"sample\">").count(), 1);
        assert!(body.contains("href=\"/samples/S1\""));
        assert_eq!(source.search_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sample_named_search_is_reachable() {
        let source = Arc::new(FakeSource::new(vec![Sample::new("search", "cccccccccccc")]));
        let config = Config::default();
        let queries = Arc::new(SampleQueries::new(source.clone(), config.query.clone()));
        let app = build_router(AppState::new(queries, config));

        let (status, body, _) = get(app, "/samples/search").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Analysis: search"));
        assert_eq!(source.get_calls.load(Ordering::SeqCst), 1);
        assert_eq!(source.search_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_list_params_fall_back_to_defaults() {
        for uri in ["/samples?skip=-1", "/samples?limit=abc", "/samples?skip=1&skip=2"] {
            let (app, _source) = create_test_app();
            let (status, body, _) = get(app, uri).await;

            assert_eq!(status, StatusCode::OK, "{}", uri);
            assert!(body.starts_with("<!DOCTYPE html>"), "{}", uri);
            assert_eq!(body.matches("<tr class=\"sample\">").count(), 2, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_search_page_without_terms() {
        let (app, source) = create_test_app();
        let (status, _body, _) = get(app, "/search").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(source.search_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_paths_redirect_home() {
        for uri in ["/", "/foo", "/samples/S1/runs", "/index.html"] {
            let (app, _source) = create_test_app();
            let (status, _body, location) = get(app, uri).await;

            assert_eq!(status, StatusCode::SEE_OTHER, "{}", uri);
            assert_eq!(location.as_deref(), Some(HOME_PATH));
        }
    }

    #[tokio::test]
    async fn test_health_live() {
        let (app, _source) = create_test_app();
        let (status, _, _) = get(app, "/health/live").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready_follows_backend() {
        let (app, source) = create_test_app();
        let (status, _, _) = get(app.clone(), "/health/ready").await;
        assert_eq!(status, StatusCode::OK);

        source.set_failing(true);
        let (status, _, _) = get(app, "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health_full() {
        let (app, _source) = create_test_app();
        let (status, body, _) = get(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["backend"], "healthy");
        assert_eq!(json["database"], "connected");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }
}
