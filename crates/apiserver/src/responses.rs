//! JSON bodies and status codes returned by the API

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use torrent::{Decision, ValidationError, Verdict};

/// Message returned for request bodies that fail validation
pub const INVALID_REQUEST_MESSAGE: &str =
    "invalid request structure. make sure url is valid and tolerance is between 0-255";

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

/// Application error types
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body was not valid JSON or had invalid fields
    #[error("{}", INVALID_REQUEST_MESSAGE)]
    InvalidRequest,
    /// A pipeline stage failed
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest => StatusCode::BAD_REQUEST,
            ApiError::Validation(err) => match err {
                ValidationError::DownloadFailed { .. }
                | ValidationError::ParseFailed { .. }
                | ValidationError::MetadataUnmarshalFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
        }
    }

    pub fn body(&self) -> ErrorBody {
        let err = match self {
            ApiError::InvalidRequest => {
                return ErrorBody {
                    error: INVALID_REQUEST_MESSAGE.to_string(),
                    url: None,
                    msg: None,
                }
            }
            ApiError::Validation(err) => err,
        };

        let (error, msg) = match err {
            ValidationError::MalformedUrl { .. } => ("invalid url".to_string(), None),
            ValidationError::NotATorrentFile { .. } => {
                ("url does not point to a .torrent file".to_string(), None)
            }
            ValidationError::ProbeFailed { source, .. } => (
                "content length check failed".to_string(),
                Some(format!("could not complete HEAD request. error: {source}")),
            ),
            ValidationError::TooLarge { .. } => {
                ("content length check failed".to_string(), Some(err.to_string()))
            }
            ValidationError::RequestConstructionFailed { source, .. } => {
                ("could not create GET request".to_string(), Some(source.to_string()))
            }
            ValidationError::UrlParseFailed { .. } => ("could not parse url".to_string(), None),
            ValidationError::AuthExchangeFailed { source, .. } => {
                ("could not authenticate to site".to_string(), Some(source.to_string()))
            }
            ValidationError::AuthenticationInvalid { host, .. } => {
                (format!("credentials for {host} invalid"), None)
            }
            ValidationError::DownloadFailed { source, .. } => {
                ("error downloading torrent file".to_string(), Some(source.to_string()))
            }
            ValidationError::ParseFailed { message } => {
                ("error parsing torrent file".to_string(), Some(message.clone()))
            }
            ValidationError::MetadataUnmarshalFailed { message } => {
                ("cannot unmarshal torrent metadata".to_string(), Some(message.clone()))
            }
        };

        // Download failures carry the URL inside `msg`
        let url = match err {
            ValidationError::DownloadFailed { .. } => None,
            _ => err.url().map(str::to_string),
        };

        ErrorBody { error, url, msg }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct VerdictBody {
    pub msg: &'static str,
    pub url: String,
    pub tolerance: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rar_files: Option<Vec<String>>,
}

/// Response for a request that reached a decision
#[derive(Debug)]
pub struct VerdictResponse {
    decision: Decision,
    body: VerdictBody,
}

impl VerdictResponse {
    pub fn new(url: String, tolerance: u8, verdict: Verdict) -> Self {
        let (msg, rar_files) = match verdict.decision {
            Decision::Clean => ("torrent is free of rar archives", None),
            Decision::WithinTolerance => (
                "rar files were found but count within tolerance",
                Some(verdict.rar_files),
            ),
            Decision::ExceedsTolerance => {
                ("rar files found in torrent metadata", Some(verdict.rar_files))
            }
        };
        Self {
            decision: verdict.decision,
            body: VerdictBody {
                msg,
                url,
                tolerance,
                rar_files,
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.decision {
            Decision::Clean | Decision::WithinTolerance => StatusCode::OK,
            Decision::ExceedsTolerance => StatusCode::IM_A_TEAPOT,
        }
    }
}

impl IntoResponse for VerdictResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body)).into_response()
    }
}
