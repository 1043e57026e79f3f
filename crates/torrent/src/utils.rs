//! Utility functions for vetting candidate torrent URLs

use url::Url;

use crate::constants::TORRENT_SUFFIX;
use crate::error::{ValidationError, ValidationResult};

/// Check if the URL points to a `.torrent` file, ignoring any query string
///
/// Everything from the first `?` onward is cut off before the suffix check,
/// so `http://x.com/a.torrent?passkey=1` is accepted.
pub fn is_torrent_file(candidate: &str) -> bool {
    let base = candidate
        .split_once('?')
        .map_or(candidate, |(base, _)| base);
    base.ends_with(TORRENT_SUFFIX)
}

/// Accept or reject a candidate URL
///
/// # Errors
/// * `MalformedUrl` when the string is not an http(s) URL with a host
/// * `NotATorrentFile` when the path does not end in `.torrent`
pub fn validate_url(candidate: &str) -> ValidationResult<Url> {
    let url = parse_http_url(candidate).ok_or_else(|| ValidationError::MalformedUrl {
        url: candidate.to_string(),
    })?;

    if !is_torrent_file(candidate) {
        return Err(ValidationError::NotATorrentFile {
            url: candidate.to_string(),
        });
    }

    Ok(url)
}

fn parse_http_url(candidate: &str) -> Option<Url> {
    let url = Url::parse(candidate).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Some(url),
        _ => None,
    }
}

/// Whether `host` is `domain` itself or one of its subdomains
pub fn host_matches_domain(host: &str, domain: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let domain = domain.trim_start_matches('.').to_ascii_lowercase();
    if domain.is_empty() {
        return false;
    }
    host == domain
        || host
            .strip_suffix(&domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_http_url() {
        assert!(parse_http_url("http://example.com/a.torrent").is_some());
        assert!(parse_http_url("https://example.com/a.torrent").is_some());

        // Wrong or missing scheme
        assert!(parse_http_url("ftp://example.com/a.torrent").is_none());
        assert!(parse_http_url("file:///tmp/a.torrent").is_none());
        assert!(parse_http_url("example.com/a.torrent").is_none());
        assert!(parse_http_url("magnet:?xt=urn:btih:abc123").is_none());

        // Missing host
        assert!(parse_http_url("http://").is_none());
        assert!(parse_http_url("").is_none());
    }

    #[test]
    fn test_is_torrent_file() {
        assert!(is_torrent_file("http://x.com/a.torrent"));
        assert!(is_torrent_file("http://x.com/a.torrent?x=1"));
        assert!(is_torrent_file("http://x.com/a.torrent?x=1?y=2"));

        assert!(!is_torrent_file("http://x.com/a.torrent.html"));
        assert!(!is_torrent_file("http://x.com/a.html?f=a.torrent"));
        assert!(!is_torrent_file("http://x.com/a.TORRENT"));
    }

    #[test]
    fn test_validate_url_malformed() {
        for candidate in ["not a url", "ftp://x.com/a.torrent", "http://", "mailto:a@x.com"] {
            match validate_url(candidate) {
                Err(ValidationError::MalformedUrl { url }) => assert_eq!(url, candidate),
                other => panic!("expected MalformedUrl for {candidate}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_validate_url_not_torrent() {
        match validate_url("http://x.com/a.torrent.html") {
            Err(ValidationError::NotATorrentFile { url }) => {
                assert_eq!(url, "http://x.com/a.torrent.html")
            }
            other => panic!("expected NotATorrentFile, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_url_malformed_wins_over_suffix() {
        assert!(matches!(
            validate_url("ftp://x.com/a.html"),
            Err(ValidationError::MalformedUrl { .. })
        ));
    }

    #[test]
    fn test_validate_url_accepts_query() {
        let url = validate_url("http://x.com/a.torrent?x=1").unwrap();
        assert_eq!(url.host_str(), Some("x.com"));
        assert_eq!(url.query(), Some("x=1"));
    }

    #[test]
    fn test_validate_url_is_pure() {
        let inputs = ["http://x.com/a.torrent", "http://x.com/a.txt", "nope"];
        for input in inputs {
            let first = validate_url(input).map(|u| u.to_string()).map_err(|e| e.kind());
            let second = validate_url(input).map(|u| u.to_string()).map_err(|e| e.kind());
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_host_matches_domain() {
        assert!(host_matches_domain("torrentleech.org", "torrentleech.org"));
        assert!(host_matches_domain("www.torrentleech.org", "torrentleech.org"));
        assert!(host_matches_domain("WWW.TorrentLeech.org", ".torrentleech.org"));

        assert!(!host_matches_domain("nottorrentleech.org", "torrentleech.org"));
        assert!(!host_matches_domain("torrentleech.org.evil.com", "torrentleech.org"));
        assert!(!host_matches_domain("example.com", ""));
    }
}
