//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, GalleryQuery, ListingCommand, ProfileQuery, SessionVerifier, TradeCommand,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountCommand>,
    pub sessions: Arc<dyn SessionVerifier>,
    pub trades: Arc<dyn TradeCommand>,
    pub listings: Arc<dyn ListingCommand>,
    pub profiles: Arc<dyn ProfileQuery>,
    pub gallery: Arc<dyn GalleryQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub sessions: Arc<dyn SessionVerifier>,
    pub trades: Arc<dyn TradeCommand>,
    pub listings: Arc<dyn ListingCommand>,
    pub profiles: Arc<dyn ProfileQuery>,
    pub gallery: Arc<dyn GalleryQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            accounts,
            sessions,
            trades,
            listings,
            profiles,
            gallery,
        } = ports;
        Self {
            accounts,
            sessions,
            trades,
            listings,
            profiles,
            gallery,
        }
    }
}
