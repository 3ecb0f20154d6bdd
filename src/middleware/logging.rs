//! Access log for the HTTP API

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{debug, info, warn, Level};

/// Paths whose outcome the auth handlers already log with more context
const CREDENTIAL_PATHS: &[&str] = &["/api/login", "/api/register"];

/// One line per request: method, path, status, latency.
///
/// Only the path is recorded; query strings and headers never are.
pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if path == "/health" {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let started = Instant::now();
    let response = next.run(request).await;
    let status = response.status();
    let latency_ms = started.elapsed().as_millis() as u64;

    let level = access_log_level(&path, status);
    if level == Level::WARN {
        warn!(%method, %path, status = status.as_u16(), latency_ms, "request failed");
    } else if level == Level::DEBUG {
        debug!(%method, %path, status = status.as_u16(), latency_ms, "credential request");
    } else {
        info!(%method, %path, status = status.as_u16(), latency_ms, "request");
    }

    response
}

/// 5xx at WARN, credential endpoints at DEBUG, everything else at INFO
fn access_log_level(path: &str, status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::WARN
    } else if CREDENTIAL_PATHS.contains(&path) {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    #[test]
    fn test_access_log_levels() {
        assert_eq!(
            access_log_level("/api/stores", StatusCode::OK),
            Level::INFO
        );
        assert_eq!(
            access_log_level("/api/login", StatusCode::BAD_REQUEST),
            Level::DEBUG
        );
        assert_eq!(
            access_log_level("/api/register", StatusCode::CREATED),
            Level::DEBUG
        );
        assert_eq!(
            access_log_level("/api/login", StatusCode::INTERNAL_SERVER_ERROR),
            Level::WARN
        );
    }

    #[tokio::test]
    async fn test_responses_pass_through_unchanged() {
        let app = Router::new()
            .route("/health", get(|| async { "ok" }))
            .route(
                "/boom",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .layer(middleware::from_fn(request_logging));

        for (uri, expected) in [
            ("/health", StatusCode::OK),
            ("/boom", StatusCode::INTERNAL_SERVER_ERROR),
            ("/missing", StatusCode::NOT_FOUND),
        ] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), expected);
        }
    }
}
