//! Server configuration module
//!
//! Handles loading configuration from environment variables with sensible defaults.

use std::net::SocketAddr;

use bakery_core::DEFAULT_NETWORK;

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 3000)
    pub port: u16,
    /// Server host (default: 127.0.0.1)
    pub host: [u8; 4],
    /// Allowed CORS origins, comma-separated (default: allow all in dev)
    pub allowed_origins: Option<Vec<String>>,
    /// Request body limit in MB (default: 50)
    pub body_limit_mb: usize,
    /// Maximum file size per upload in MB (default: 25)
    pub max_file_size_mb: usize,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Enable rate limiting (default: false for tests, true when loaded from env)
    pub rate_limit_enabled: bool,
    /// Rate limit: requests per second (default: 10)
    pub rate_limit_per_sec: u64,
    /// Rate limit: burst size (default: 20)
    pub rate_limit_burst: u32,
    /// Network passed to the verifier (default: sepolia)
    pub network: String,
    /// Honour the `mock` form field on /verify (default: false, enable with ALLOW_MOCK_VERIFIER=true)
    pub allow_mock_verifier: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            host: [127, 0, 0, 1],
            allowed_origins: None, // None = allow all (dev mode)
            body_limit_mb: 50,
            max_file_size_mb: 25,
            timeout_secs: 30,
            rate_limit_enabled: false, // Disabled by default (for tests)
            rate_limit_per_sec: 10,
            rate_limit_burst: 20,
            network: DEFAULT_NETWORK.to_string(),
            allow_mock_verifier: true, // Enabled by default for tests; from_env() defaults to false
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let port = env_parse("PORT").unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .map(|h| {
                if h == "0.0.0.0" {
                    [0, 0, 0, 0]
                } else {
                    [127, 0, 0, 1]
                }
            })
            .unwrap_or([127, 0, 0, 1]);

        let allowed_origins = std::env::var("ALLOWED_ORIGINS").ok().map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        // Enabled unless explicitly turned off
        let rate_limit_enabled = std::env::var("RATE_LIMIT_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        let network = std::env::var("BAKERY_VERIFIER_NETWORK")
            .ok()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_NETWORK.to_string());

        let allow_mock_verifier = std::env::var("ALLOW_MOCK_VERIFIER")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        Self {
            port,
            host,
            allowed_origins,
            body_limit_mb: env_parse("BODY_LIMIT_MB").unwrap_or(50),
            max_file_size_mb: env_parse("MAX_FILE_SIZE_MB").unwrap_or(25),
            timeout_secs: env_parse("REQUEST_TIMEOUT_SECS").unwrap_or(30),
            rate_limit_enabled,
            rate_limit_per_sec: env_parse("RATE_LIMIT_PER_SEC").unwrap_or(10),
            rate_limit_burst: env_parse("RATE_LIMIT_BURST").unwrap_or(20),
            network,
            allow_mock_verifier,
        }
    }

    /// Get the socket address for binding
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }

    /// Maximum upload size in bytes
    pub fn max_file_size(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, [127, 0, 0, 1]);
        assert!(!config.rate_limit_enabled);
        assert!(config.allow_mock_verifier);
        assert_eq!(config.network, "sepolia");
    }

    #[test]
    fn test_socket_addr() {
        let config = Config {
            port: 8080,
            host: [0, 0, 0, 0],
            ..Default::default()
        };
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_max_file_size() {
        let config = Config {
            max_file_size_mb: 2,
            ..Default::default()
        };
        assert_eq!(config.max_file_size(), 2 * 1024 * 1024);
    }
}
