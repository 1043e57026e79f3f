//! Torrent validation pipeline
//!
//! This crate downloads `.torrent` files, decodes them and reports whether
//! the content contains more rar archives than the caller tolerates. It
//! handles the size probe, session-based login against the one tracker
//! that requires it, bencode decoding and the final decision.

pub mod auth;
pub mod config;
pub mod constants;
pub mod decision;
pub mod error;
pub mod fetch;
pub mod files;
pub mod metainfo;
pub mod session;
pub mod size;
pub mod torrent;
pub mod utils;

pub use auth::{Authenticator, Credentials};
pub use config::Config;
pub use decision::{decide, Decision};
pub use error::{ValidationError, ValidationResult};
pub use metainfo::TorrentMetadata;
pub use session::{SessionCookie, SessionStore};
pub use torrent::{TorrentValidator, Verdict};
