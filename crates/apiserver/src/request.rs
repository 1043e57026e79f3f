//! Parsing of `/validate-url` request bodies
//!
//! The body is first read as untyped JSON so the access log can show what
//! the caller actually sent, then coerced into a [`TorrentRequest`].

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Fields as the caller sent them, before any validation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawRequest {
    pub url: Option<Value>,
    pub tolerance: Option<Value>,
}

/// A well-formed validation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentRequest {
    pub url: String,
    /// Number of rar files the caller accepts, 0 when omitted
    pub tolerance: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("request body is not valid JSON: {0}")]
    MalformedJson(String),
    #[error("request body is not a JSON object")]
    NotAnObject,
    #[error("url must be a string")]
    InvalidUrl,
    #[error("tolerance must be an integer between 0 and 255")]
    InvalidTolerance,
}

/// A request body split into its raw form and the result of validating it
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRequest {
    pub raw: RawRequest,
    pub validated: Result<TorrentRequest, RequestError>,
}

impl ValidationRequest {
    pub fn from_body(body: &[u8]) -> Self {
        let document = match serde_json::from_slice::<Value>(body) {
            Ok(document) => document,
            Err(e) => {
                return Self {
                    raw: RawRequest::default(),
                    validated: Err(RequestError::MalformedJson(e.to_string())),
                }
            }
        };

        let Value::Object(mut fields) = document else {
            return Self {
                raw: RawRequest::default(),
                validated: Err(RequestError::NotAnObject),
            };
        };

        let raw = RawRequest {
            url: fields.remove("url"),
            tolerance: fields.remove("tolerance"),
        };
        let validated = coerce(&raw);
        Self { raw, validated }
    }
}

fn coerce(raw: &RawRequest) -> Result<TorrentRequest, RequestError> {
    let url = match &raw.url {
        Some(Value::String(url)) => url.clone(),
        _ => return Err(RequestError::InvalidUrl),
    };
    let tolerance = match &raw.tolerance {
        None | Some(Value::Null) => 0,
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u8::try_from(n).ok())
            .ok_or(RequestError::InvalidTolerance)?,
        Some(_) => return Err(RequestError::InvalidTolerance),
    };
    Ok(TorrentRequest { url, tolerance })
}
