//! API server configuration.

use std::net::SocketAddr;

use crate::error::{ApiError, ApiResult};

/// Bind configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ApiConfig {
    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `CAROUSEL_API_HOST`: Bind host (default: "0.0.0.0")
    /// - `CAROUSEL_API_PORT`: Bind port (default: 8080)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: std::env::var("CAROUSEL_API_HOST")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.host),
            port: std::env::var("CAROUSEL_API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    /// Resolve the socket address to bind.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ApiError::internal_error(format!("Invalid bind address: {}", e)))
    }
}
