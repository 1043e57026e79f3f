//! Pipeline configuration read from the environment

use std::time::Duration;

use crate::auth::Credentials;
use crate::constants::{DEFAULT_AUTH_DOMAIN, DEFAULT_REQUEST_TIMEOUT_SECS, MAX_TORRENT_BYTES};

/// Settings for [`crate::TorrentValidator`]
#[derive(Debug, Clone)]
pub struct Config {
    /// Domain of the tracker that needs a login
    pub auth_domain: String,
    /// Login for that tracker
    pub credentials: Credentials,
    /// Timeout applied to the probe, the login and the download
    pub request_timeout: Duration,
    /// Largest torrent file that will be downloaded
    pub max_torrent_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_domain: DEFAULT_AUTH_DOMAIN.to_string(),
            credentials: Credentials::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_torrent_bytes: MAX_TORRENT_BYTES,
        }
    }
}

impl Config {
    /// Create a configuration from environment variables
    ///
    /// Reads `tlUsername`, `tlPassword`, `tlHost` and `requestTimeout`.
    /// Missing credentials are not an error here; they are reported when a
    /// login is actually needed.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create a configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let auth_domain = lookup("tlHost")
            .map(|host| host.trim().to_string())
            .filter(|host| !host.is_empty())
            .unwrap_or(defaults.auth_domain);

        let request_timeout = match lookup("requestTimeout") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(
                        "requestTimeout is invalid. Currently set to: `{}`, will use {} seconds",
                        raw,
                        DEFAULT_REQUEST_TIMEOUT_SECS
                    );
                    defaults.request_timeout
                }
            },
            None => defaults.request_timeout,
        };

        Self {
            auth_domain,
            credentials: Credentials::new(lookup("tlUsername"), lookup("tlPassword")),
            request_timeout,
            max_torrent_bytes: defaults.max_torrent_bytes,
        }
    }
}
