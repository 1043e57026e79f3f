//! Per-request access log

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;

/// Request-specific fields a handler hands to the access log.
///
/// Handlers insert this into the response extensions; [`access_log`] picks
/// it up after the handler has run.
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    /// Caller-supplied `url`, as sent
    pub url: Option<Value>,
    /// Caller-supplied `tolerance`, as sent
    pub tolerance: Option<Value>,
    /// Number of `.rar` entries when a decision was reached
    pub rar_count: Option<usize>,
    /// Machine name of the failure, if any
    pub error: Option<&'static str>,
}

impl RequestLog {
    fn url_field(&self) -> String {
        self.url.as_ref().map(Value::to_string).unwrap_or_default()
    }

    fn tolerance_field(&self) -> String {
        self.tolerance.as_ref().map(Value::to_string).unwrap_or_default()
    }
}

/// Emits one `access` event per request
pub async fn access_log(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default();

    let response = next.run(request).await;

    let latency_ms = started.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    match response.extensions().get::<RequestLog>() {
        Some(log) => tracing::info!(
            target: "access",
            timestamp = %timestamp,
            status,
            method = %method,
            path = %path,
            ip = %ip,
            latency_ms,
            url = %log.url_field(),
            tolerance = %log.tolerance_field(),
            rar_count = log.rar_count,
            error = log.error,
            "request"
        ),
        None => tracing::info!(
            target: "access",
            timestamp = %timestamp,
            status,
            method = %method,
            path = %path,
            ip = %ip,
            latency_ms,
            "request"
        ),
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_fields_render_as_json() {
        let log = RequestLog {
            url: Some(json!("http://x.com/a.torrent")),
            tolerance: Some(json!(-3)),
            ..Default::default()
        };
        assert_eq!(log.url_field(), "\"http://x.com/a.torrent\"");
        assert_eq!(log.tolerance_field(), "-3");
    }

    #[test]
    fn test_missing_fields_render_empty() {
        let log = RequestLog::default();
        assert_eq!(log.url_field(), "");
        assert_eq!(log.tolerance_field(), "");
    }
}
