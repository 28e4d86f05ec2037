//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed marketplace entities used by the API and
//! persistence layers, the pure purchase settlement rules, and the services
//! that implement the driving ports. Keep types immutable and document
//! invariants and serialisation contracts in each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure taxonomy.
//! - Money: fixed-point amount with two fractional digits.
//! - UserAccount, Artwork, ArtworkSummary, Acquisition: marketplace records.
//! - settle: ordered purchase preconditions and balance effects.

pub mod account_service;
pub mod acquisition;
pub mod artwork;
pub mod auth;
pub mod error;
pub mod gallery_service;
pub mod image;
pub mod listing_service;
pub mod money;
pub mod ports;
pub mod purchase;
pub mod trace_id;
pub mod trade_service;
pub mod user;

pub use self::account_service::AccountService;
pub use self::acquisition::{
    Acquisition, AcquisitionId, OwnedAcquisition, sort_by_acquisition_date,
};
pub use self::artwork::{
    Artwork, ArtworkId, ArtworkSummary, ArtworkTitle, ArtworkValidationError, Author, AuthorId,
    NewArtwork, TITLE_MAX, parse_publication_date,
};
pub use self::auth::{
    CredentialsValidationError, LoginCredentials, Password, PasswordHash, SessionToken,
    StoredCredentials,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::gallery_service::MarketQueryService;
pub use self::image::{BlobKey, IMAGE_REF_MAX, ImagePayload, ImageRef, ImageValidationError};
pub use self::listing_service::ListingService;
pub use self::money::{MONEY_SCALE, Money, MoneyError};
pub use self::purchase::{
    ListedArtwork, PurchaseReceipt, PurchaseRejection, PurchaseSnapshot, Settlement, settle,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::trade_service::{DEFAULT_OPERATION_TIMEOUT, TradeService};
pub use self::user::{
    FULL_NAME_MAX, FullName, LOGIN_MAX, LoginName, UserAccount, UserId, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use artmarket::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::unauthorized("missing bearer token"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
