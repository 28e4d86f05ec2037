//! Read-model service for profiles and the gallery.
//!
//! Reads are lock-free and may observe availability that a concurrent
//! purchase is about to change.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::account_service::map_user_error;
use crate::domain::listing_service::map_catalogue_error;
use crate::domain::ports::{
    CatalogueRepository, GalleryQuery, ProfileQuery, UserProfile, UserRepository,
};
use crate::domain::{
    ArtworkId, ArtworkSummary, Author, Error, UserId, sort_by_acquisition_date,
};

/// Query service implementing [`ProfileQuery`] and [`GalleryQuery`].
#[derive(Clone)]
pub struct MarketQueryService<U, C> {
    users: Arc<U>,
    catalogue: Arc<C>,
}

impl<U, C> MarketQueryService<U, C> {
    /// Create a query service.
    pub fn new(users: Arc<U>, catalogue: Arc<C>) -> Self {
        Self { users, catalogue }
    }
}

#[async_trait]
impl<U, C> ProfileQuery for MarketQueryService<U, C>
where
    U: UserRepository,
    C: CatalogueRepository,
{
    async fn fetch_profile(&self, user_id: &UserId) -> Result<UserProfile, Error> {
        let account = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found").with_reason("user_not_found"))?;
        let mut acquisitions = self
            .catalogue
            .acquisitions_for(user_id)
            .await
            .map_err(map_catalogue_error)?;
        sort_by_acquisition_date(&mut acquisitions);
        Ok(UserProfile {
            account,
            acquisitions,
        })
    }
}

#[async_trait]
impl<U, C> GalleryQuery for MarketQueryService<U, C>
where
    U: Send + Sync,
    C: CatalogueRepository,
{
    async fn list_available(&self) -> Result<Vec<ArtworkSummary>, Error> {
        self.catalogue
            .list_available()
            .await
            .map_err(map_catalogue_error)
    }

    async fn get_artwork(&self, id: &ArtworkId) -> Result<ArtworkSummary, Error> {
        self.catalogue
            .find_artwork(id)
            .await
            .map_err(map_catalogue_error)?
            .ok_or_else(|| {
                Error::not_found(format!("artwork {id} not found")).with_reason("artwork_not_found")
            })
    }

    async fn list_listed_by(&self, owner: &UserId) -> Result<Vec<ArtworkSummary>, Error> {
        self.catalogue
            .list_by_owner(owner)
            .await
            .map_err(map_catalogue_error)
    }

    async fn list_authors(&self) -> Result<Vec<Author>, Error> {
        self.catalogue
            .list_authors()
            .await
            .map_err(map_catalogue_error)
    }
}
