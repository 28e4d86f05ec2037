//! Builders wiring outbound adapters into domain services and HTTP state.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use tracing::info;

use crate::domain::ports::{
    BlobUploadError, BlobUploadGateway, CatalogueRepository, FixtureBlobUploadGateway,
    LedgerRepository, PasswordHasher, SessionTokens, UserRepository,
};
use crate::domain::{
    AccountService, BlobKey, ImagePayload, ImageRef, ListingService, MarketQueryService,
    TradeService,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::auth::{Argon2PasswordHasher, JwtSessionTokens};
use crate::outbound::blob::HttpBlobUploadGateway;
use crate::outbound::memory::InMemoryMarketStore;
use crate::outbound::persistence::{
    DieselCatalogueRepository, DieselLedgerRepository, DieselUserRepository,
};

use super::ServerConfig;

/// Driven adapters the marketplace services are assembled from.
pub struct MarketAdapters<U, C, L, H, T, B> {
    pub users: Arc<U>,
    pub catalogue: Arc<C>,
    pub ledger: Arc<L>,
    pub hasher: Arc<H>,
    pub tokens: Arc<T>,
    pub blobs: Arc<B>,
}

impl<U, C, L, H, T, B> MarketAdapters<U, C, L, H, T, B>
where
    U: UserRepository + 'static,
    C: CatalogueRepository + 'static,
    L: LedgerRepository + 'static,
    H: PasswordHasher + 'static,
    T: SessionTokens + 'static,
    B: BlobUploadGateway + 'static,
{
    /// Build the domain services and expose them as HTTP state ports.
    pub fn into_http_state(self, clock: Arc<dyn Clock>, operation_timeout: Duration) -> HttpState {
        let Self {
            users,
            catalogue,
            ledger,
            hasher,
            tokens,
            blobs,
        } = self;

        let accounts = Arc::new(AccountService::new(
            users.clone(),
            hasher,
            tokens,
            blobs.clone(),
        ));
        let queries = Arc::new(MarketQueryService::new(users, catalogue.clone()));
        let trades = Arc::new(TradeService::new(ledger, clock).with_timeout(operation_timeout));
        let listings = Arc::new(ListingService::new(catalogue, blobs));

        HttpState::new(HttpStatePorts {
            accounts: accounts.clone(),
            sessions: accounts,
            trades,
            listings,
            profiles: queries.clone(),
            gallery: queries,
        })
    }
}

/// Blob gateway selected at startup.
pub enum ConfiguredBlobGateway {
    /// Uploads to an HTTP object store.
    Http(HttpBlobUploadGateway),
    /// Stores nothing and hands back references under a fixed prefix.
    Fixture(FixtureBlobUploadGateway),
}

#[async_trait]
impl BlobUploadGateway for ConfiguredBlobGateway {
    async fn upload(
        &self,
        key: &BlobKey,
        payload: ImagePayload,
    ) -> Result<ImageRef, BlobUploadError> {
        match self {
            Self::Http(gateway) => gateway.upload(key, payload).await,
            Self::Fixture(gateway) => gateway.upload(key, payload).await,
        }
    }
}

fn build_blob_gateway(config: &ServerConfig) -> std::io::Result<ConfiguredBlobGateway> {
    match &config.blob {
        Some(blob) => {
            let gateway = HttpBlobUploadGateway::new(
                blob.endpoint.clone(),
                blob.public_base_url.clone(),
                blob.timeout,
            )
            .map_err(|err| std::io::Error::other(format!("blob client: {err}")))?;
            info!(endpoint = %blob.endpoint, "uploading images to object store");
            Ok(ConfiguredBlobGateway::Http(gateway))
        }
        None => {
            info!(
                base = %config.public_image_base,
                "no blob endpoint configured; image bytes are discarded"
            );
            Ok(ConfiguredBlobGateway::Fixture(FixtureBlobUploadGateway::new(
                config.public_image_base.clone(),
            )))
        }
    }
}

/// Build the HTTP state from configuration.
///
/// Uses the Diesel repositories when a pool is configured and the in-memory
/// store otherwise.
///
/// # Errors
/// Returns [`std::io::Error`] when an adapter cannot be constructed.
pub fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let hasher = Arc::new(
        Argon2PasswordHasher::new()
            .map_err(|err| std::io::Error::other(format!("password hasher: {err}")))?,
    );
    let tokens = Arc::new(JwtSessionTokens::new(
        &config.tokens.secret,
        config.tokens.ttl,
        clock.clone(),
    ));
    let blobs = Arc::new(build_blob_gateway(config)?);

    let state = match &config.db_pool {
        Some(pool) => MarketAdapters {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            catalogue: Arc::new(DieselCatalogueRepository::new(pool.clone())),
            ledger: Arc::new(DieselLedgerRepository::new(pool.clone())),
            hasher,
            tokens,
            blobs,
        }
        .into_http_state(clock, config.operation_timeout),
        None => {
            info!("no database configured; using the in-memory store");
            let store = Arc::new(InMemoryMarketStore::new());
            MarketAdapters {
                users: store.clone(),
                catalogue: store.clone(),
                ledger: store,
                hasher,
                tokens,
                blobs,
            }
            .into_http_state(clock, config.operation_timeout)
        }
    };
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ArtworkId;
    use crate::inbound::http::token_config::TokenSettings;
    use rstest::rstest;
    use zeroize::Zeroizing;

    fn config() -> ServerConfig {
        ServerConfig::new(
            "127.0.0.1:0".parse().expect("addr"),
            TokenSettings {
                secret: Zeroizing::new(vec![b'k'; 32]),
                ttl: Duration::from_secs(60),
            },
        )
        .with_public_image_base("https://cdn.test/art/")
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_gateway_is_used_without_endpoint() {
        let gateway = build_blob_gateway(&config()).expect("gateway");
        assert!(matches!(gateway, ConfiguredBlobGateway::Fixture(_)));

        let key = BlobKey::artwork_image(&ArtworkId::random());
        let reference = gateway
            .upload(&key, ImagePayload::from_bytes(vec![1, 2, 3]).expect("payload"))
            .await
            .expect("upload");
        assert!(reference.as_str().starts_with("https://cdn.test/art/"));
    }

    #[rstest]
    fn in_memory_state_builds_without_database() {
        assert!(build_http_state(&config()).is_ok());
    }
}
