//! Listing domain service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::account_service::upload_image;
use crate::domain::ports::{
    BlobUploadGateway, CatalogueRepository, CatalogueRepositoryError, ListingCommand,
    ListingRequest,
};
use crate::domain::{Artwork, ArtworkId, AuthorId, BlobKey, Error, UserId};

pub(crate) fn map_catalogue_error(error: CatalogueRepositoryError) -> Error {
    match error {
        CatalogueRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("catalogue unavailable: {message}"))
        }
        CatalogueRepositoryError::Query { message } => {
            Error::internal(format!("catalogue error: {message}"))
        }
        CatalogueRepositoryError::UnknownAuthor { author_id } => author_not_found(&author_id),
    }
}

fn author_not_found(author_id: &str) -> Error {
    Error::not_found(format!("author {author_id} not found")).with_reason("author_not_found")
}

/// Listing service implementing [`ListingCommand`].
#[derive(Clone)]
pub struct ListingService<C, B> {
    catalogue: Arc<C>,
    blobs: Arc<B>,
}

impl<C, B> ListingService<C, B> {
    /// Create a listing service.
    pub fn new(catalogue: Arc<C>, blobs: Arc<B>) -> Self {
        Self { catalogue, blobs }
    }
}

impl<C, B> ListingService<C, B>
where
    C: CatalogueRepository,
{
    async fn ensure_author(&self, author_id: &AuthorId) -> Result<(), Error> {
        self.catalogue
            .find_author(author_id)
            .await
            .map_err(map_catalogue_error)?
            .map(|_| ())
            .ok_or_else(|| author_not_found(&author_id.to_string()))
    }
}

#[async_trait]
impl<C, B> ListingCommand for ListingService<C, B>
where
    C: CatalogueRepository,
    B: BlobUploadGateway,
{
    async fn create_artwork(
        &self,
        owner: &UserId,
        request: ListingRequest,
    ) -> Result<Artwork, Error> {
        let ListingRequest { artwork, image } = request;
        self.ensure_author(&artwork.author_id).await?;

        let id = ArtworkId::random();
        let image = upload_image(self.blobs.as_ref(), &BlobKey::artwork_image(&id), image).await?;
        let listed = Artwork {
            id,
            title: artwork.title,
            author_id: artwork.author_id,
            published_on: artwork.published_on,
            available: true,
            price: artwork.price,
            image,
            owner_id: *owner,
        };
        self.catalogue
            .create_artwork(&listed)
            .await
            .map_err(map_catalogue_error)?;
        info!(artwork_id = %listed.id, owner_id = %owner, price = %listed.price, "artwork listed");
        Ok(listed)
    }
}
