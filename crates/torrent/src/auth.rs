//! Login against the tracker that only serves torrents to signed-in users

use std::fmt;
use std::sync::Arc;

use reqwest::Client;
use tokio::sync::Mutex;
use url::Url;

use crate::error::{ValidationError, ValidationResult};
use crate::session::SessionStore;
use crate::utils::host_matches_domain;

/// Username/password pair for the tracker, either of which may be missing
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    username: Option<String>,
    password: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Credentials {
    pub fn new(username: Option<String>, password: Option<String>) -> Self {
        Self { username, password }
    }

    /// Username and password for the login form
    ///
    /// Missing values are logged and replaced with empty strings; the login
    /// then fails on the tracker's side and the decode step reports it.
    fn form_values(&self, url: &Url) -> (String, String) {
        if self.username.is_none() {
            tracing::error!("environment variable tlUsername not set, cannot check torrent at {}", url);
        }
        if self.password.is_none() {
            tracing::error!("environment variable tlPassword not set, cannot check torrent at {}", url);
        }
        (
            self.username.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
        )
    }
}

/// Signs in to the login-protected tracker on demand
///
/// Session cookies land in the shared [`SessionStore`] through the HTTP
/// client's cookie provider, so the client passed to
/// [`Authenticator::ensure_authenticated`] must be built on the same store.
#[derive(Debug)]
pub struct Authenticator {
    domain: String,
    credentials: Credentials,
    sessions: Arc<SessionStore>,
    login_lock: Mutex<()>,
}

impl Authenticator {
    pub fn new(domain: impl Into<String>, credentials: Credentials, sessions: Arc<SessionStore>) -> Self {
        Self {
            domain: domain.into(),
            credentials,
            sessions,
            login_lock: Mutex::new(()),
        }
    }

    /// Domain of the login-protected tracker
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Whether `url` points at the login-protected tracker
    ///
    /// # Errors
    /// * `UrlParseFailed` when the URL has no host
    pub fn requires_login(&self, url: &Url) -> ValidationResult<bool> {
        let host = host_of(url)?;
        Ok(host_matches_domain(host, &self.domain))
    }

    /// Make sure a tracker session exists before downloading from `url`
    ///
    /// Does nothing for other hosts or when a session cookie is already
    /// stored. Otherwise posts the credentials to the tracker's landing page.
    /// Concurrent callers wait for a single login instead of each sending one.
    ///
    /// # Errors
    /// * `UrlParseFailed` when the URL has no host
    /// * `AuthExchangeFailed` when the login request cannot be completed
    pub async fn ensure_authenticated(&self, client: &Client, url: &Url) -> ValidationResult<()> {
        if !self.requires_login(url)? {
            return Ok(());
        }
        let host = host_of(url)?;
        if self.sessions.has_session(url) {
            tracing::debug!("Reusing stored session for {}", host);
            return Ok(());
        }

        let _guard = self.login_lock.lock().await;
        if self.sessions.has_session(url) {
            tracing::debug!("Session for {} established by a concurrent request", host);
            return Ok(());
        }

        let (username, password) = self.credentials.form_values(url);
        let landing = landing_url(url);
        tracing::info!("Logging in to {}", landing);

        let response = client
            .post(landing)
            .form(&[("username", username.as_str()), ("password", password.as_str())])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to log in to {}: {}", host, e);
                ValidationError::AuthExchangeFailed {
                    url: url.to_string(),
                    source: e,
                }
            })?;

        if self.sessions.has_session(url) {
            tracing::info!("Logged in to {}", host);
        } else {
            tracing::warn!(
                "Login to {} answered {} without session cookies",
                host,
                response.status()
            );
        }
        Ok(())
    }
}

fn host_of(url: &Url) -> ValidationResult<&str> {
    url.host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| ValidationError::UrlParseFailed {
            url: url.to_string(),
        })
}

/// Root page of the host serving `url`
fn landing_url(url: &Url) -> Url {
    let mut landing = url.clone();
    landing.set_path("/");
    landing.set_query(None);
    landing.set_fragment(None);
    landing
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(sessions: &Arc<SessionStore>) -> Client {
        Client::builder()
            .cookie_provider(Arc::clone(sessions))
            .build()
            .unwrap()
    }

    fn credentials() -> Credentials {
        Credentials::new(Some("alice".into()), Some("secret".into()))
    }

    fn torrent_url(server: &MockServer) -> Url {
        format!("{}/download/1/a.torrent?x=1", server.uri()).parse().unwrap()
    }

    #[test]
    fn test_landing_url() {
        let url: Url = "https://www.torrentleech.org/download/1/a.torrent?x=1#f".parse().unwrap();
        assert_eq!(landing_url(&url).as_str(), "https://www.torrentleech.org/");
    }

    #[test]
    fn test_requires_login() {
        let auth = Authenticator::new("torrentleech.org", credentials(), Arc::default());
        let tl: Url = "https://www.torrentleech.org/a.torrent".parse().unwrap();
        let other: Url = "https://example.com/a.torrent".parse().unwrap();
        assert!(auth.requires_login(&tl).unwrap());
        assert!(!auth.requires_login(&other).unwrap());

        let no_host: Url = "data:text/plain,a.torrent".parse().unwrap();
        assert!(matches!(
            auth.requires_login(&no_host),
            Err(ValidationError::UrlParseFailed { .. })
        ));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let debug = format!("{:?}", credentials());
        assert!(debug.contains("alice"));
        assert!(!debug.contains("secret"));
    }

    #[tokio::test]
    async fn test_login_records_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_string_contains("username=alice"))
            .and(body_string_contains("password=secret"))
            .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "tluid=42; Path=/"))
            .expect(1)
            .mount(&server)
            .await;

        let sessions = Arc::new(SessionStore::new());
        let auth = Authenticator::new("127.0.0.1", credentials(), Arc::clone(&sessions));
        let url = torrent_url(&server);

        auth.ensure_authenticated(&client(&sessions), &url).await.unwrap();
        assert!(sessions.has_session(&url));

        // Second call reuses the stored session
        auth.ensure_authenticated(&client(&sessions), &url).await.unwrap();
    }

    #[tokio::test]
    async fn test_deleted_session_triggers_new_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "tluid=42; Path=/"))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/logout"))
            .respond_with(ResponseTemplate::new(200).insert_header(
                "set-cookie",
                "tluid=deleted; Expires=Thu, 01-Jan-1970 00:00:01 GMT; Path=/",
            ))
            .mount(&server)
            .await;

        let sessions = Arc::new(SessionStore::new());
        let auth = Authenticator::new("127.0.0.1", credentials(), Arc::clone(&sessions));
        let client = client(&sessions);
        let url = torrent_url(&server);

        auth.ensure_authenticated(&client, &url).await.unwrap();
        assert!(sessions.has_session(&url));

        client
            .get(format!("{}/logout", server.uri()))
            .send()
            .await
            .unwrap();
        assert!(!sessions.has_session(&url));

        auth.ensure_authenticated(&client, &url).await.unwrap();
        assert!(sessions.has_session(&url));
    }

    #[tokio::test]
    async fn test_concurrent_first_requests_log_in_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "tlpass=abc; Path=/"))
            .expect(1)
            .mount(&server)
            .await;

        let sessions = Arc::new(SessionStore::new());
        let auth = Authenticator::new("127.0.0.1", credentials(), Arc::clone(&sessions));
        let client = client(&sessions);
        let url = torrent_url(&server);

        let (a, b) = tokio::join!(
            auth.ensure_authenticated(&client, &url),
            auth.ensure_authenticated(&client, &url)
        );
        assert!(a.is_ok() && b.is_ok());
    }

    #[tokio::test]
    async fn test_other_hosts_skip_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let sessions = Arc::new(SessionStore::new());
        let auth = Authenticator::new("torrentleech.org", credentials(), Arc::clone(&sessions));
        auth.ensure_authenticated(&client(&sessions), &torrent_url(&server))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_credentials_still_attempt_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("username=&password="))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let sessions = Arc::new(SessionStore::new());
        let auth = Authenticator::new("127.0.0.1", Credentials::default(), Arc::clone(&sessions));
        auth.ensure_authenticated(&client(&sessions), &torrent_url(&server))
            .await
            .unwrap();
        assert!(!sessions.has_session(&torrent_url(&server)));
    }

    #[tokio::test]
    async fn test_login_transport_failure() {
        let sessions = Arc::new(SessionStore::new());
        let auth = Authenticator::new("127.0.0.1", credentials(), Arc::clone(&sessions));
        let url: Url = "http://127.0.0.1:1/a.torrent".parse().unwrap();
        let err = auth
            .ensure_authenticated(&client(&sessions), &url)
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::AuthExchangeFailed { .. }), "{err:?}");
    }
}
