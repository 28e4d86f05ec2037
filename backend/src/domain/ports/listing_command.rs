//! Driving port for listing artworks for sale.

use async_trait::async_trait;

use crate::domain::{Artwork, Error, ImagePayload, NewArtwork, UserId};

/// Validated listing input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub artwork: NewArtwork,
    pub image: ImagePayload,
}

/// Domain use-case port for creating listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingCommand: Send + Sync {
    /// Upload the image and create an available artwork owned by `owner`.
    async fn create_artwork(&self, owner: &UserId, request: ListingRequest)
    -> Result<Artwork, Error>;
}
