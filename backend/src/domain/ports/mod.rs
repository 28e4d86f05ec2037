//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`BlobUploadGateway`], [`PasswordHasher`],
//! [`SessionTokens`]) are implemented by outbound adapters. Driving ports
//! (`*Command`, `*Query`, [`SessionVerifier`]) are implemented by domain
//! services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod blob_upload_gateway;
mod catalogue_repository;
mod ledger_repository;
mod listing_command;
mod market_queries;
mod password_hasher;
mod session_tokens;
mod trade_command;
mod user_repository;

#[cfg(test)]
pub use account_command::{MockAccountCommand, MockSessionVerifier};
pub use account_command::{
    AccountCommand, ProfileChange, RegistrationRequest, SessionGrant, SessionVerifier,
};
#[cfg(test)]
pub use blob_upload_gateway::MockBlobUploadGateway;
pub use blob_upload_gateway::{BlobUploadError, BlobUploadGateway, FixtureBlobUploadGateway};
#[cfg(test)]
pub use catalogue_repository::MockCatalogueRepository;
pub use catalogue_repository::{CatalogueRepository, CatalogueRepositoryError};
#[cfg(test)]
pub use ledger_repository::MockLedgerRepository;
pub use ledger_repository::{LedgerRepository, LedgerRepositoryError, PurchaseOrder};
#[cfg(test)]
pub use listing_command::MockListingCommand;
pub use listing_command::{ListingCommand, ListingRequest};
#[cfg(test)]
pub use market_queries::{MockGalleryQuery, MockProfileQuery};
pub use market_queries::{GalleryQuery, ProfileQuery, UserProfile};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use session_tokens::MockSessionTokens;
pub use session_tokens::{IssuedSession, SessionTokenError, SessionTokens};
#[cfg(test)]
pub use trade_command::MockTradeCommand;
pub use trade_command::TradeCommand;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{NewUserRecord, ProfileUpdate, UserPersistenceError, UserRepository};
