//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use clap::Parser;
use tracing::error;
use url::Url;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "Magpie", about = "Server-rendered todos with cookie authentication")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    pub port: u16,

    /// Base URL of the upstream API server (auth endpoints + GraphQL)
    #[arg(long, env = "SERVER_ENDPOINT")]
    pub server_endpoint: String,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Parse and validate the upstream endpoint URL.
/// Returns None and logs an error if validation fails.
pub fn validate_endpoint(endpoint: &str) -> Option<Url> {
    let url = match Url::parse(endpoint) {
        Ok(url) => url,
        Err(e) => {
            error!(endpoint = %endpoint, error = %e, "Invalid server endpoint URL");
            return None;
        }
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        error!(endpoint = %endpoint, "Server endpoint must be an http(s) URL");
        return None;
    }

    Some(url)
}

/// Build ServerConfig from validated arguments.
pub fn build_config(upstream_endpoint: Url) -> ServerConfig {
    ServerConfig { upstream_endpoint }
}
