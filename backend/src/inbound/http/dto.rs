//! JSON response bodies and their OpenAPI schemas.
//!
//! Domain records stay free of framework derives; handlers convert them into
//! these camelCase DTOs. Monetary values are decimal strings with two
//! fractional digits and dates are ISO-8601 calendar dates.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::{SessionGrant, UserProfile};
use crate::domain::{
    Artwork, ArtworkSummary, Author, OwnedAcquisition, PurchaseReceipt, UserAccount,
};

/// Public view of a user account.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "frida")]
    pub login: String,
    #[schema(example = "Frida Kahlo")]
    pub full_name: String,
    #[schema(example = "https://blobs.example.com/profiles/frida_profile.jpg")]
    pub image: String,
    #[schema(example = "130.00")]
    pub balance: String,
}

impl From<UserAccount> for AccountResponse {
    fn from(value: UserAccount) -> Self {
        Self {
            id: value.id.to_string(),
            login: value.login.to_string(),
            full_name: value.full_name.as_str().to_owned(),
            image: value.image.as_str().to_owned(),
            balance: value.balance.to_string(),
        }
    }
}

/// Issued session token.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub user_id: String,
    /// Bearer token for the `Authorization` header.
    pub token: String,
    /// RFC 3339 expiry instant.
    #[schema(example = "2026-03-01T13:00:00Z")]
    pub expires_at: String,
}

impl From<SessionGrant> for SessionResponse {
    fn from(value: SessionGrant) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            token: value.token.as_str().to_owned(),
            expires_at: value.expires_at.to_rfc3339(),
        }
    }
}

/// A purchased artwork on the buyer's profile.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionResponse {
    pub acquisition_id: String,
    pub artwork_id: String,
    pub title: String,
    pub author_name: String,
    #[schema(example = "30.00")]
    pub price: String,
    #[schema(example = "1939-01-01")]
    pub published_on: String,
    #[schema(example = "2026-03-01")]
    pub acquired_on: String,
    pub image: String,
}

impl From<OwnedAcquisition> for AcquisitionResponse {
    fn from(value: OwnedAcquisition) -> Self {
        Self {
            acquisition_id: value.acquisition_id.to_string(),
            artwork_id: value.artwork_id.to_string(),
            title: value.title.as_str().to_owned(),
            author_name: value.author_name,
            price: value.price.to_string(),
            published_on: value.published_on.to_string(),
            acquired_on: value.acquired_on.to_string(),
            image: value.image.as_str().to_owned(),
        }
    }
}

/// The caller's profile with owned artworks.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub account: AccountResponse,
    pub acquisitions: Vec<AcquisitionResponse>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(value: UserProfile) -> Self {
        Self {
            account: value.account.into(),
            acquisitions: value.acquisitions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Balance after a top-up.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    #[schema(example = "150.00")]
    pub balance: String,
}

/// A newly listed artwork.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkResponse {
    pub id: String,
    pub title: String,
    pub author_id: String,
    #[schema(example = "1939-01-01")]
    pub published_on: String,
    pub available: bool,
    #[schema(example = "30.00")]
    pub price: String,
    pub image: String,
    pub owner_id: String,
}

impl From<Artwork> for ArtworkResponse {
    fn from(value: Artwork) -> Self {
        Self {
            id: value.id.to_string(),
            title: value.title.as_str().to_owned(),
            author_id: value.author_id.to_string(),
            published_on: value.published_on.to_string(),
            available: value.available,
            price: value.price.to_string(),
            image: value.image.as_str().to_owned(),
            owner_id: value.owner_id.to_string(),
        }
    }
}

/// Gallery entry joined with author and owner names.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkSummaryResponse {
    pub id: String,
    pub title: String,
    pub author_id: String,
    pub author_name: String,
    #[schema(example = "1939-01-01")]
    pub published_on: String,
    pub available: bool,
    #[schema(example = "30.00")]
    pub price: String,
    pub image: String,
    pub owner_id: String,
    pub owner_login: String,
    pub owner_name: String,
}

impl From<ArtworkSummary> for ArtworkSummaryResponse {
    fn from(value: ArtworkSummary) -> Self {
        Self {
            id: value.id.to_string(),
            title: value.title.as_str().to_owned(),
            author_id: value.author_id.to_string(),
            author_name: value.author_name,
            published_on: value.published_on.to_string(),
            available: value.available,
            price: value.price.to_string(),
            image: value.image.as_str().to_owned(),
            owner_id: value.owner_id.to_string(),
            owner_login: value.owner_login.to_string(),
            owner_name: value.owner_name.as_str().to_owned(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    pub id: String,
    #[schema(example = "Remedios Varo")]
    pub name: String,
}

impl From<Author> for AuthorResponse {
    fn from(value: Author) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
        }
    }
}

/// Outcome of a committed purchase.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub acquisition_id: String,
    pub artwork_id: String,
    #[schema(example = "30.00")]
    pub price: String,
    #[schema(example = "20.00")]
    pub remaining_balance: String,
    #[schema(example = "2026-03-01")]
    pub acquired_on: String,
}

impl From<PurchaseReceipt> for PurchaseResponse {
    fn from(value: PurchaseReceipt) -> Self {
        Self {
            acquisition_id: value.acquisition_id.to_string(),
            artwork_id: value.artwork_id.to_string(),
            price: value.price.to_string(),
            remaining_balance: value.remaining_balance.to_string(),
            acquired_on: value.acquired_on.to_string(),
        }
    }
}
