//! Acquisition ledger entries.
//!
//! An acquisition is appended exactly once per successful purchase and never
//! mutated. The store enforces one acquisition per artwork.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{ArtworkId, ArtworkTitle, ImageRef, Money, UserId};

/// Acquisition identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct AcquisitionId(Uuid);

impl AcquisitionId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for AcquisitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<AcquisitionId> for String {
    fn from(value: AcquisitionId) -> Self {
        value.0.to_string()
    }
}

/// Immutable record of one completed purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Acquisition {
    /// Identifier.
    pub id: AcquisitionId,
    /// Purchasing user.
    pub buyer_id: UserId,
    /// Purchased artwork.
    pub artwork_id: ArtworkId,
    /// Calendar date of the purchase.
    pub acquired_on: NaiveDate,
}

/// Acquisition joined with artwork and author details for the profile view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedAcquisition {
    /// Ledger entry identifier.
    pub acquisition_id: AcquisitionId,
    /// Purchased artwork.
    pub artwork_id: ArtworkId,
    /// Artwork title.
    pub title: ArtworkTitle,
    /// Author display name.
    pub author_name: String,
    /// Price paid.
    pub price: Money,
    /// Artwork publication date.
    pub published_on: NaiveDate,
    /// Purchase date.
    pub acquired_on: NaiveDate,
    /// Artwork image.
    pub image: ImageRef,
}

/// Order acquisitions by purchase date, then by id for a stable tie-break.
pub fn sort_by_acquisition_date(entries: &mut [OwnedAcquisition]) {
    entries.sort_by(|a, b| {
        a.acquired_on
            .cmp(&b.acquired_on)
            .then_with(|| a.acquisition_id.cmp(&b.acquisition_id))
    });
}
