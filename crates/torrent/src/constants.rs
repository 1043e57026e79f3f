//! Constants shared by the validation pipeline

/// Largest `.torrent` file the service is willing to buffer (100 MB)
pub const MAX_TORRENT_BYTES: u64 = 100_000_000;

/// Default timeout applied to every outbound request, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Domain of the tracker that requires a logged-in session
pub const DEFAULT_AUTH_DOMAIN: &str = "torrentleech.org";

/// Cookie names that identify a logged-in tracker session
pub const SESSION_COOKIE_NAMES: [&str; 2] = ["tluid", "tlpass"];

/// Suffix a URL path must carry to be considered a torrent file
pub const TORRENT_SUFFIX: &str = ".torrent";

/// Suffix that marks a file as a rar archive volume
pub const RAR_SUFFIX: &str = ".rar";

/// Deepest list/dictionary nesting accepted in a `.torrent` file
///
/// Real metainfo nests five levels at most. The decoder recurses once per
/// level, so anything deeper is rejected before decoding.
pub const MAX_BENCODE_DEPTH: usize = 64;
