//! Route handlers

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;

use crate::logging::RequestLog;
use crate::request::ValidationRequest;
use crate::responses::{ApiError, VerdictResponse};
use crate::state::ServerState;

/// Runs the validation pipeline for the URL in the request body
pub async fn validate_url(State(state): State<ServerState>, body: Bytes) -> Response {
    let request = ValidationRequest::from_body(&body);
    let mut log = RequestLog {
        url: request.raw.url,
        tolerance: request.raw.tolerance,
        ..Default::default()
    };

    let candidate = match request.validated {
        Ok(candidate) => candidate,
        Err(e) => {
            tracing::debug!("rejecting request body: {}", e);
            log.error = Some("invalid_request");
            return (Extension(log), ApiError::InvalidRequest).into_response();
        }
    };

    match state.validator().validate(&candidate.url, candidate.tolerance).await {
        Ok(verdict) => {
            log.rar_count = Some(verdict.rar_files.len());
            let response = VerdictResponse::new(candidate.url, candidate.tolerance, verdict);
            (Extension(log), response).into_response()
        }
        Err(e) => {
            log.error = Some(e.kind());
            let error = ApiError::from(e);
            if error.status().is_server_error() {
                tracing::error!(url = %candidate.url, "validation failed: {}", error);
            } else {
                tracing::warn!(url = %candidate.url, "validation failed: {}", error);
            }
            (Extension(log), error).into_response()
        }
    }
}

/// Health check endpoint
pub async fn healthcheck() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "okay" })))
}

#[derive(Debug, Serialize)]
pub struct CookieView {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CookieList {
    pub cookies: Vec<CookieView>,
}

/// Lists the session cookies held for the tracker that requires login
pub async fn session_cookies(State(state): State<ServerState>) -> impl IntoResponse {
    let cookies = state
        .sessions()
        .session_cookies_under(state.auth_domain())
        .into_iter()
        .map(|cookie| CookieView {
            value: cookie.value().to_string(),
            expires: cookie.expires.map(|at| {
                DateTime::<Utc>::from(at).to_rfc3339_opts(SecondsFormat::Secs, true)
            }),
            name: cookie.name,
            domain: cookie.domain,
            path: cookie.path,
            secure: cookie.secure,
        })
        .collect();

    (StatusCode::ACCEPTED, Json(CookieList { cookies }))
}
