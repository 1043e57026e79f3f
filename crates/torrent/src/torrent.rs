use std::sync::Arc;

use reqwest::Client;
use serde::Serialize;

use crate::auth::Authenticator;
use crate::config::Config;
use crate::decision::{decide, Decision};
use crate::error::{ValidationError, ValidationResult};
use crate::session::SessionStore;
use crate::{fetch, files, metainfo, size, utils};

/// Result of a validation that got as far as decoding the torrent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub decision: Decision,
    /// Every file name in the torrent
    pub file_names: Vec<String>,
    /// The subset of `file_names` classified as rar archives
    pub rar_files: Vec<String>,
}

/// Runs the validation pipeline against remote `.torrent` files
///
/// Cheap to clone; clones share the HTTP client and the session store.
#[derive(Clone)]
pub struct TorrentValidator {
    client: Client,
    sessions: Arc<SessionStore>,
    auth: Arc<Authenticator>,
    max_torrent_bytes: u64,
}

impl TorrentValidator {
    /// Create a validator with a fresh session store
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        Self::with_sessions(config, Arc::new(SessionStore::new()))
    }

    /// Create a validator on top of an existing session store
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn with_sessions(config: Config, sessions: Arc<SessionStore>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .cookie_provider(Arc::clone(&sessions))
            .timeout(config.request_timeout)
            .build()?;
        let auth = Authenticator::new(config.auth_domain, config.credentials, Arc::clone(&sessions));
        Ok(Self {
            client,
            sessions,
            auth: Arc::new(auth),
            max_torrent_bytes: config.max_torrent_bytes,
        })
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Domain of the tracker that needs a login
    pub fn auth_domain(&self) -> &str {
        self.auth.domain()
    }

    /// Check the torrent at `candidate` for rar archives
    ///
    /// Stages run strictly in order and the first failure ends the run:
    /// URL checks, HEAD size probe, tracker login when needed, download,
    /// decode, classification and the tolerance decision.
    ///
    /// # Errors
    /// Returns the `ValidationError` of the first stage that failed
    pub async fn validate(&self, candidate: &str, tolerance: u8) -> ValidationResult<Verdict> {
        let url = utils::validate_url(candidate)?;
        tracing::info!("Validating torrent at {} with tolerance {}", url, tolerance);

        size::check_size(&self.client, &url, self.max_torrent_bytes).await?;

        let request = self.client.get(url.clone()).build().map_err(|e| {
            ValidationError::RequestConstructionFailed {
                url: candidate.to_string(),
                source: e,
            }
        })?;

        let from_auth_host = self.auth.requires_login(&url)?;
        if from_auth_host {
            self.auth.ensure_authenticated(&self.client, &url).await?;
        }

        let body = fetch::fetch(&self.client, request, self.max_torrent_bytes).await?;
        let metadata = metainfo::decode(&body, from_auth_host.then_some(&url))?;

        let file_names = files::file_names(&metadata);
        let rar_files = files::rar_files(&file_names);
        let decision = decide(rar_files.len(), tolerance);
        tracing::info!(
            "{}: {} file(s), {} rar file(s), {:?}",
            url,
            file_names.len(),
            rar_files.len(),
            decision
        );

        Ok(Verdict {
            decision,
            file_names,
            rar_files,
        })
    }
}
