//! Server settings read from the environment

/// Port used when `serverPort` is unset or invalid
pub const DEFAULT_PORT: u16 = 8080;

/// Address the server binds to
pub const DEFAULT_HOST: &str = "0.0.0.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Mount the session cookie debug endpoint
    pub cookie_debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cookie_debug: false,
        }
    }
}

impl ServerConfig {
    /// Create a configuration from `serverPort` and `enableCookieDebug`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = match lookup("serverPort") {
            Some(raw) => parse_port(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    "serverPort is invalid. Currently set to: `{}`, will ignore and use default value",
                    raw
                );
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };
        let cookie_debug = lookup("enableCookieDebug")
            .map(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            port,
            cookie_debug,
            ..Self::default()
        }
    }
}

/// Parse a port number between 1 and 65535
pub fn parse_port(raw: &str) -> Option<u16> {
    raw.trim().parse::<u16>().ok().filter(|port| *port != 0)
}
