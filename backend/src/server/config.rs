//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::DEFAULT_OPERATION_TIMEOUT;
use crate::inbound::http::token_config::TokenSettings;
use crate::outbound::persistence::DbPool;
use crate::settings::BlobSettings;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) tokens: TokenSettings,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) blob: Option<BlobSettings>,
    pub(crate) public_image_base: String,
    pub(crate) operation_timeout: Duration,
}

impl ServerConfig {
    /// Construct a configuration that keeps state in memory and stores no
    /// image bytes.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, tokens: TokenSettings) -> Self {
        Self {
            bind_addr,
            tokens,
            db_pool: None,
            blob: None,
            public_image_base: "/images".to_owned(),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, the Diesel repositories replace the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Upload images to an HTTP object store.
    #[must_use]
    pub fn with_blob_store(mut self, blob: BlobSettings) -> Self {
        self.blob = Some(blob);
        self
    }

    /// Prefix for image references when no object store is configured.
    #[must_use]
    pub fn with_public_image_base(mut self, base: impl Into<String>) -> Self {
        self.public_image_base = base.into();
        self
    }

    /// Bound each purchase-engine operation.
    #[must_use]
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
