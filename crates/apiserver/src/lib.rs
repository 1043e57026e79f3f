//! HTTP API for validating torrents by URL
//!
//! This crate exposes the torrent validation pipeline over HTTP, maps its
//! failures to status codes and JSON bodies, and writes one access-log
//! event per request.

mod config;
mod handlers;
mod logging;
mod request;
mod responses;
mod server;
mod state;

pub use config::ServerConfig;
pub use logging::RequestLog;
pub use request::{RawRequest, RequestError, TorrentRequest, ValidationRequest};
pub use server::ApiServer;
pub use state::ServerState;

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
