use thiserror::Error;

/// Everything that can stop a torrent validation before a decision is made
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Not an absolute http(s) URL with a host
    #[error("invalid url: {url}")]
    MalformedUrl { url: String },

    /// The path (query stripped) does not end in `.torrent`
    #[error("url does not point to a .torrent file: {url}")]
    NotATorrentFile { url: String },

    /// The HEAD probe could not be completed or returned an error status
    #[error("could not complete HEAD request for {url}: {source}")]
    ProbeFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The resource is bigger than the service is willing to buffer
    #[error("content-length of {length} exceeds permitted length of {limit}")]
    TooLarge { url: String, length: u64, limit: u64 },

    #[error("could not create GET request for {url}: {source}")]
    RequestConstructionFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not parse host from {url}")]
    UrlParseFailed { url: String },

    /// Transport failure while posting the login form
    #[error("could not authenticate to {url}: {source}")]
    AuthExchangeFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("error downloading torrent file {url}: {source}")]
    DownloadFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The tracker answered with something that is not bencode, which it
    /// only does when the session is missing or expired
    #[error("credentials for {host} invalid")]
    AuthenticationInvalid { url: String, host: String },

    #[error("error parsing torrent file: {message}")]
    ParseFailed { message: String },

    #[error("cannot unmarshal torrent metadata: {message}")]
    MetadataUnmarshalFailed { message: String },
}

impl ValidationError {
    /// Stable machine-readable name of the failure, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::MalformedUrl { .. } => "malformed_url",
            ValidationError::NotATorrentFile { .. } => "not_a_torrent_file",
            ValidationError::ProbeFailed { .. } => "probe_failed",
            ValidationError::TooLarge { .. } => "too_large",
            ValidationError::RequestConstructionFailed { .. } => "request_construction_failed",
            ValidationError::UrlParseFailed { .. } => "url_parse_failed",
            ValidationError::AuthExchangeFailed { .. } => "auth_exchange_failed",
            ValidationError::DownloadFailed { .. } => "download_failed",
            ValidationError::AuthenticationInvalid { .. } => "authentication_invalid",
            ValidationError::ParseFailed { .. } => "parse_failed",
            ValidationError::MetadataUnmarshalFailed { .. } => "metadata_unmarshal_failed",
        }
    }

    /// The URL the failing stage was working on, when the stage knows it
    pub fn url(&self) -> Option<&str> {
        match self {
            ValidationError::MalformedUrl { url }
            | ValidationError::NotATorrentFile { url }
            | ValidationError::ProbeFailed { url, .. }
            | ValidationError::TooLarge { url, .. }
            | ValidationError::RequestConstructionFailed { url, .. }
            | ValidationError::UrlParseFailed { url }
            | ValidationError::AuthExchangeFailed { url, .. }
            | ValidationError::DownloadFailed { url, .. }
            | ValidationError::AuthenticationInvalid { url, .. } => Some(url),
            ValidationError::ParseFailed { .. } | ValidationError::MetadataUnmarshalFailed { .. } => {
                None
            }
        }
    }

    pub(crate) fn probe(url: &url::Url, source: reqwest::Error) -> Self {
        ValidationError::ProbeFailed {
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn download(url: &url::Url, source: reqwest::Error) -> Self {
        ValidationError::DownloadFailed {
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn too_large(url: &url::Url, length: u64, limit: u64) -> Self {
        ValidationError::TooLarge {
            url: url.to_string(),
            length,
            limit,
        }
    }
}

/// Result type alias for pipeline stages
pub type ValidationResult<T> = Result<T, ValidationError>;
