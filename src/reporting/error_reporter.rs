//! Optional forwarding of failures to a Sentry-compatible collector.
//!
//! The reporter is disabled unless a DSN is configured. Request failures reach
//! it through `report_failures`, which looks for a `FailureReport` extension on
//! outgoing responses.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use reqwest::Url;
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

/// Attached to a response (as an extension) when the request failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub message: String,
    pub method: Option<String>,
    pub uri: Option<String>,
}

impl FailureReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), method: None, uri: None }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DsnError {
    #[error("malformed DSN: {0}")]
    Malformed(String),
    #[error("DSN has no public key")]
    MissingKey,
    #[error("DSN has no project id")]
    MissingProject,
}

struct Target {
    client: reqwest::Client,
    store_url: Url,
    auth_header: String,
}

#[derive(Clone, Default)]
pub struct ErrorReporter {
    target: Option<Arc<Target>>,
}

impl ErrorReporter {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn from_settings(dsn: Option<&str>) -> Result<Self, DsnError> {
        match dsn {
            Some(dsn) => Self::from_dsn(dsn),
            None => Ok(Self::disabled()),
        }
    }

    /// Parses `scheme://public_key@host[:port][/prefix]/project_id`.
    pub fn from_dsn(dsn: &str) -> Result<Self, DsnError> {
        let url = Url::parse(dsn.trim()).map_err(|e| DsnError::Malformed(e.to_string()))?;
        let key = url.username();
        if key.is_empty() {
            return Err(DsnError::MissingKey);
        }
        let host = url
            .host_str()
            .ok_or_else(|| DsnError::Malformed("missing host".to_string()))?;

        let path = url.path().trim_end_matches('/');
        let (prefix, project) = path.rsplit_once('/').unwrap_or(("", path));
        if project.is_empty() {
            return Err(DsnError::MissingProject);
        }

        let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
        let store_url = Url::parse(&format!("{}://{host}{port}{prefix}/api/{project}/store/", url.scheme()))
            .map_err(|e| DsnError::Malformed(e.to_string()))?;
        let auth_header = format!(
            "Sentry sentry_version=7, sentry_client={}/{}, sentry_key={key}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
        );

        Ok(Self {
            target: Some(Arc::new(Target { client: reqwest::Client::new(), store_url, auth_header })),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    pub fn store_url(&self) -> Option<&Url> {
        self.target.as_ref().map(|t| &t.store_url)
    }

    /// Sends the report and waits for the collector. Delivery problems are
    /// logged, never returned.
    pub async fn send(&self, report: &FailureReport) {
        let Some(target) = &self.target else { return };

        let result = target
            .client
            .post(target.store_url.clone())
            .header("X-Sentry-Auth", &target.auth_header)
            .json(&build_event(report))
            .send()
            .await
            .and_then(|response| response.error_for_status());

        match result {
            Ok(_) => tracing::debug!("failure reported"),
            Err(e) => tracing::warn!(error = %e, "could not deliver failure report"),
        }
    }

    /// Fire-and-forget variant for the request path. Must run inside a Tokio runtime.
    pub fn capture(&self, report: FailureReport) {
        if !self.is_enabled() {
            return;
        }
        let reporter = self.clone();
        tokio::spawn(async move { reporter.send(&report).await });
    }
}

/// Builds the JSON event body for the collector's store endpoint.
pub fn build_event(report: &FailureReport) -> Value {
    let mut event = json!({
        "event_id": Uuid::new_v4().simple().to_string(),
        "timestamp": Utc::now().to_rfc3339(),
        "level": "error",
        "platform": "other",
        "logger": env!("CARGO_PKG_NAME"),
        "message": { "formatted": report.message },
    });
    if let (Some(method), Some(uri)) = (&report.method, &report.uri) {
        event["request"] = json!({ "method": method, "url": uri });
    }
    event
}

/// Middleware that forwards failed requests to the reporter.
pub async fn report_failures(State(reporter): State<ErrorReporter>, request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let uri = request.uri().to_string();

    let response = next.run(request).await;

    if let Some(report) = response.extensions().get::<FailureReport>() {
        tracing::error!(%method, %uri, status = %response.status(), "request failed: {}", report.message);
        reporter.capture(FailureReport { method: Some(method), uri: Some(uri), ..report.clone() });
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware, response::IntoResponse, routing::get, Router};
    use tower::ServiceExt;

    #[test]
    fn dsn_maps_to_store_endpoint() {
        let reporter = ErrorReporter::from_dsn("https://abc123@o1.ingest.example.com/42").unwrap();

        assert!(reporter.is_enabled());
        assert_eq!(
            reporter.store_url().unwrap().as_str(),
            "https://o1.ingest.example.com/api/42/store/"
        );
    }

    #[test]
    fn dsn_keeps_port_and_path_prefix() {
        let reporter = ErrorReporter::from_dsn("http://key@localhost:9000/sentry/7").unwrap();

        assert_eq!(reporter.store_url().unwrap().as_str(), "http://localhost:9000/sentry/api/7/store/");
    }

    #[test]
    fn dsn_errors() {
        assert_eq!(
            ErrorReporter::from_dsn("https://example.com/42").err(),
            Some(DsnError::MissingKey)
        );
        assert_eq!(
            ErrorReporter::from_dsn("https://key@example.com/").err(),
            Some(DsnError::MissingProject)
        );
        assert!(matches!(ErrorReporter::from_dsn("not a url"), Err(DsnError::Malformed(_))));
    }

    #[test]
    fn no_dsn_means_disabled() {
        let reporter = ErrorReporter::from_settings(None).unwrap();
        assert!(!reporter.is_enabled());
        assert!(reporter.store_url().is_none());

        // Nothing is spawned, so no runtime is needed.
        reporter.capture(FailureReport::new("ignored"));
    }

    #[test]
    fn event_carries_message_and_request() {
        let report = FailureReport {
            message: "boom".into(),
            method: Some("GET".into()),
            uri: Some("/read".into()),
        };

        let event = build_event(&report);

        assert_eq!(event["level"], "error");
        assert_eq!(event["message"]["formatted"], "boom");
        assert_eq!(event["request"]["url"], "/read");
        assert_eq!(event["event_id"].as_str().unwrap().len(), 32);
    }

    #[test]
    fn event_without_request_has_no_request_field() {
        let event = build_event(&FailureReport::new("startup"));
        assert!(event.get("request").is_none());
    }

    #[tokio::test]
    async fn middleware_passes_responses_through() {
        async fn failing() -> Response {
            let mut response = (StatusCode::INTERNAL_SERVER_ERROR, "broken").into_response();
            response.extensions_mut().insert(FailureReport::new("broken"));
            response
        }

        let app = Router::new()
            .route("/fail", get(failing))
            .route("/ok", get(|| async { "fine" }))
            .layer(middleware::from_fn_with_state(ErrorReporter::disabled(), report_failures));

        let response = app
            .clone()
            .oneshot(axum::http::Request::builder().uri("/fail").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = app
            .oneshot(axum::http::Request::builder().uri("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
