//! In-memory session store shared by every request
//!
//! The store is installed as the cookie provider of the shared HTTP client,
//! so cookies set by the tracker during login are attached to later
//! downloads automatically. Cookie parsing, scoping and expiry are handled
//! by `cookie_store`; this module only adds the notion of a tracker session
//! on top of it.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use cookie_store::{CookieDomain, CookieExpiration, RawCookie};
use reqwest::cookie::CookieStore as _;
use reqwest::header::HeaderValue;
use reqwest_cookie_store::CookieStoreRwLock;
use url::Url;

use crate::constants::SESSION_COOKIE_NAMES;
use crate::utils::host_matches_domain;

/// Snapshot of a stored session cookie
///
/// The value is redacted in Debug output so cookies can be logged safely.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookie {
    /// Cookie name
    pub name: String,
    /// Domain the cookie is scoped to, without a leading dot
    pub domain: String,
    /// `true` when the cookie had no Domain attribute and only matches `domain` exactly
    pub host_only: bool,
    /// URL path scope
    pub path: String,
    /// Only sent over https
    pub secure: bool,
    /// `None` for session cookies
    pub expires: Option<SystemTime>,
    value: String,
}

impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCookie")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .field("host_only", &self.host_only)
            .field("path", &self.path)
            .field("secure", &self.secure)
            .field("expires", &self.expires)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl SessionCookie {
    fn from_stored(cookie: &cookie_store::Cookie<'_>) -> Self {
        let (domain, host_only) = match &cookie.domain {
            CookieDomain::HostOnly(host) => (host.clone(), true),
            CookieDomain::Suffix(suffix) => (suffix.clone(), false),
            CookieDomain::NotPresent | CookieDomain::Empty => (String::new(), false),
        };
        let expires = match &cookie.expires {
            CookieExpiration::AtUtc(at) => u64::try_from(at.unix_timestamp())
                .ok()
                .map(|secs| UNIX_EPOCH + Duration::from_secs(secs)),
            CookieExpiration::SessionEnd => None,
        };
        Self {
            name: cookie.name().to_string(),
            domain,
            host_only,
            path: cookie.path().unwrap_or("/").to_string(),
            secure: cookie.secure().unwrap_or(false),
            expires,
            value: cookie.value().to_string(),
        }
    }

    /// Returns the cookie value
    pub fn value(&self) -> &str {
        &self.value
    }
}

fn is_session_cookie(name: &str) -> bool {
    SESSION_COOKIE_NAMES.contains(&name)
}

/// Process-wide cookie jar
pub struct SessionStore {
    jar: CookieStoreRwLock,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            jar: CookieStoreRwLock::new(cookie_store::CookieStore::default()),
        }
    }

    /// Check whether a logged-in session exists for requests to `url`
    ///
    /// True iff an unexpired cookie named `tluid` or `tlpass` would be sent
    /// along with a request to the URL.
    pub fn has_session(&self, url: &Url) -> bool {
        let store = self.jar.read().unwrap_or_else(|e| e.into_inner());
        store
            .matches(url)
            .iter()
            .any(|cookie| is_session_cookie(cookie.name()))
    }

    /// Unexpired session-identifying cookies scoped to `domain` or any of its
    /// subdomains, ordered by domain then name
    pub fn session_cookies_under(&self, domain: &str) -> Vec<SessionCookie> {
        let store = self.jar.read().unwrap_or_else(|e| e.into_inner());
        let mut cookies: Vec<SessionCookie> = store
            .iter_unexpired()
            .filter(|cookie| is_session_cookie(cookie.name()))
            .map(SessionCookie::from_stored)
            .filter(|cookie| host_matches_domain(&cookie.domain, domain))
            .collect();
        cookies.sort_by(|a, b| (&a.domain, &a.name).cmp(&(&b.domain, &b.name)));
        cookies
    }

    /// Merge `Set-Cookie` header values received from `url` into the store
    ///
    /// The whole batch is applied under one write lock. Cookies whose
    /// Domain does not cover the sender are dropped, and already-expired
    /// cookies delete the stored cookie they name.
    pub fn record_cookies<'a>(&self, url: &Url, set_cookie_headers: impl IntoIterator<Item = &'a str>) {
        let cookies: Vec<RawCookie<'static>> = set_cookie_headers
            .into_iter()
            .filter_map(|header| match RawCookie::parse(header.to_owned()) {
                Ok(cookie) => Some(cookie),
                Err(e) => {
                    tracing::debug!("Ignoring unparseable cookie from {}: {}", url, e);
                    None
                }
            })
            .collect();
        if cookies.is_empty() {
            return;
        }

        tracing::debug!("Recording {} cookie(s) from {}", cookies.len(), url);
        let mut store = self.jar.write().unwrap_or_else(|e| e.into_inner());
        store.store_response_cookies(cookies.into_iter(), url);
    }
}

impl reqwest::cookie::CookieStore for SessionStore {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.record_cookies(url, cookie_headers.filter_map(|value| value.to_str().ok()));
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.jar.cookies(url)
    }
}
