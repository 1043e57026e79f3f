//! Shared state handed to every route

use std::sync::Arc;

use torrent::{SessionStore, TorrentValidator};

/// Server state holding the validation pipeline
#[derive(Clone)]
pub struct ServerState {
    validator: TorrentValidator,
}

impl ServerState {
    /// Create new server state
    ///
    /// # Arguments
    /// * `validator` - Pipeline shared by all requests; it owns the HTTP
    ///   client and the session store
    pub fn new(validator: TorrentValidator) -> Self {
        Self { validator }
    }

    pub fn validator(&self) -> &TorrentValidator {
        &self.validator
    }

    /// Session cookies collected by the shared HTTP client
    pub fn sessions(&self) -> &Arc<SessionStore> {
        self.validator.sessions()
    }

    /// Domain whose hosts require a login
    pub fn auth_domain(&self) -> &str {
        self.validator.auth_domain()
    }
}
