//! HEAD probe that keeps oversized downloads out of memory

use reqwest::header::{HeaderMap, CONTENT_LENGTH};
use reqwest::{Client, Response};
use url::Url;

use crate::error::{ValidationError, ValidationResult};

/// Probe `url` with a HEAD request and reject it if it advertises more than
/// `max_bytes`
///
/// A missing or unparseable `Content-Length` passes; the fetcher enforces
/// the same limit while reading the body.
///
/// # Errors
/// * `ProbeFailed` when the request fails or returns a non-success status
/// * `TooLarge` when the advertised size exceeds `max_bytes`
pub async fn check_size(client: &Client, url: &Url, max_bytes: u64) -> ValidationResult<()> {
    let response = client
        .head(url.clone())
        .send()
        .await
        .and_then(Response::error_for_status)
        .map_err(|e| ValidationError::probe(url, e))?;

    check_length(url, advertised_length(response.headers()), max_bytes)
}

/// Read `Content-Length` from the response headers
///
/// `Response::content_length` reports the body size, which is always zero
/// for HEAD, so the header is parsed directly.
pub fn advertised_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

fn check_length(url: &Url, length: Option<u64>, max_bytes: u64) -> ValidationResult<()> {
    match length {
        Some(length) if length > max_bytes => {
            tracing::warn!("{} advertises {} bytes, limit is {}", url, length, max_bytes);
            Err(ValidationError::too_large(url, length, max_bytes))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn headers(length: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static(length));
        headers
    }

    #[test]
    fn test_advertised_length() {
        assert_eq!(advertised_length(&headers("1234")), Some(1234));
        assert_eq!(advertised_length(&headers(" 42 ")), Some(42));
        assert_eq!(advertised_length(&headers("lots")), None);
        assert_eq!(advertised_length(&HeaderMap::new()), None);
    }

    #[test]
    fn test_check_length() {
        let url: Url = "http://x.com/a.torrent".parse().unwrap();
        assert!(check_length(&url, None, 100).is_ok());
        assert!(check_length(&url, Some(100), 100).is_ok());
        match check_length(&url, Some(101), 100) {
            Err(ValidationError::TooLarge { length, limit, .. }) => {
                assert_eq!((length, limit), (101, 100))
            }
            other => panic!("expected TooLarge, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_check_size_accepts_small_file() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/a.torrent"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let url: Url = format!("{}/a.torrent", server.uri()).parse().unwrap();
        let result = check_size(&Client::new(), &url, 100_000_000).await;
        assert!(result.is_ok(), "{result:?}");
    }

    #[tokio::test]
    async fn test_check_size_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url: Url = format!("{}/missing.torrent", server.uri()).parse().unwrap();
        let err = check_size(&Client::new(), &url, 100).await.unwrap_err();
        assert!(matches!(err, ValidationError::ProbeFailed { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn test_check_size_unreachable() {
        let url: Url = "http://127.0.0.1:1/a.torrent".parse().unwrap();
        let err = check_size(&Client::new(), &url, 100).await.unwrap_err();
        assert!(matches!(err, ValidationError::ProbeFailed { .. }), "{err:?}");
    }
}
