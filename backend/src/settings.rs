//! Server configuration loaded via OrthoConfig.
//!
//! Values come from CLI arguments, `ARTMARKET_*` environment variables and
//! configuration files. Token secrets are handled separately by
//! [`crate::inbound::http::token_config`].

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DEFAULT_OPERATION_TIMEOUT;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_BLOB_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_PUBLIC_IMAGE_BASE: &str = "/images";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind address is not a valid `host:port` socket address.
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// The blob endpoint is not an absolute URL.
    #[error("invalid blob endpoint '{value}': {source}")]
    BlobEndpoint {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// Blob storage settings resolved from [`ServerSettings`].
#[derive(Debug, Clone)]
pub struct BlobSettings {
    /// Object store endpoint receiving `PUT {endpoint}/{key}`.
    pub endpoint: url::Url,
    /// Prefix of the public references handed back to clients.
    pub public_base_url: String,
    /// Per-request timeout of the upload client.
    pub timeout: Duration,
}

/// Configuration values controlling the HTTP server and its adapters.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ARTMARKET")]
pub struct ServerSettings {
    /// Socket address to bind, e.g. `0.0.0.0:8080`.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without it the server keeps state in memory.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Upper bound on a single store operation, in milliseconds.
    #[ortho_config(default = 10_000)]
    pub operation_timeout_ms: u64,
    /// Object store endpoint for uploaded images.
    pub blob_endpoint: Option<String>,
    /// Public URL prefix for uploaded images.
    pub blob_public_url: Option<String>,
    /// Upload request timeout, in milliseconds.
    pub blob_timeout_ms: Option<u64>,
}

impl ServerSettings {
    /// Parse the configured bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Pool size, defaulting to ten connections.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Operation timeout applied by the purchase engine; zero selects the default.
    pub fn operation_timeout(&self) -> Duration {
        match self.operation_timeout_ms {
            0 => DEFAULT_OPERATION_TIMEOUT,
            ms => Duration::from_millis(ms),
        }
    }

    /// Public prefix used for image references.
    pub fn public_image_base(&self) -> &str {
        self.blob_public_url
            .as_deref()
            .unwrap_or(DEFAULT_PUBLIC_IMAGE_BASE)
    }

    /// Blob upload settings, or `None` when no endpoint is configured.
    pub fn blob(&self) -> Result<Option<BlobSettings>, SettingsError> {
        let Some(raw) = self.blob_endpoint.as_deref().map(str::trim) else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }
        let endpoint = url::Url::parse(raw).map_err(|source| SettingsError::BlobEndpoint {
            value: raw.to_owned(),
            source,
        })?;
        let public_base_url = self
            .blob_public_url
            .clone()
            .unwrap_or_else(|| endpoint.as_str().trim_end_matches('/').to_owned());
        let timeout = self
            .blob_timeout_ms
            .filter(|ms| *ms > 0)
            .map_or(DEFAULT_BLOB_TIMEOUT, Duration::from_millis);
        Ok(Some(BlobSettings {
            endpoint,
            public_base_url,
            timeout,
        }))
    }
}
