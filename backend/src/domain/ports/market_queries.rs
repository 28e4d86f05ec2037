//! Driving ports for the read models: the caller's profile and the gallery.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{ArtworkId, ArtworkSummary, Author, Error, OwnedAcquisition, UserAccount, UserId};

/// A user's profile with the artworks they have bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub account: UserAccount,
    /// Ordered by acquisition date, then acquisition id.
    pub acquisitions: Vec<OwnedAcquisition>,
}

/// Profile read model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileQuery: Send + Sync {
    /// Load the profile of `user_id`.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<UserProfile, Error>;
}

/// Gallery read model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GalleryQuery: Send + Sync {
    /// Artworks currently for sale.
    async fn list_available(&self) -> Result<Vec<ArtworkSummary>, Error>;

    /// One artwork, sold or not.
    async fn get_artwork(&self, id: &ArtworkId) -> Result<ArtworkSummary, Error>;

    /// Artworks listed by `owner`.
    async fn list_listed_by(&self, owner: &UserId) -> Result<Vec<ArtworkSummary>, Error>;

    /// Catalogue authors.
    async fn list_authors(&self) -> Result<Vec<Author>, Error>;
}
