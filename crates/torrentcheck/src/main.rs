use apiserver::{ApiServer, ServerConfig};
use torrent::{Config, TorrentValidator};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    let _ = dotenv::dotenv();

    // One JSON object per log line, `RUST_LOG` overrides the level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().json().with_env_filter(filter).init();

    let config = Config::from_env();
    let server_config = ServerConfig::from_env();

    let validator = match TorrentValidator::new(config) {
        Ok(validator) => validator,
        Err(e) => {
            tracing::error!("Failed to build HTTP client: {}", e);
            return;
        }
    };

    tracing::info!(
        auth_domain = validator.auth_domain(),
        "Torrent validator initialized"
    );

    let server = ApiServer::new(validator, server_config.cookie_debug);
    if let Err(e) = server.serve(&server_config.host, server_config.port).await {
        tracing::error!("API server error: {}", e);
        std::process::exit(1);
    }
}
