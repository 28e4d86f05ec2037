//! Port for the catalogue store: authors, artworks and the read side of the
//! acquisition ledger.
//!
//! Reads are lock-free and may observe slightly stale availability; the
//! purchase path re-reads under lock through the ledger port.

use async_trait::async_trait;

use crate::domain::{Artwork, ArtworkId, ArtworkSummary, Author, AuthorId, OwnedAcquisition, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalogue adapters.
    pub enum CatalogueRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "catalogue connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } =>
            "catalogue query failed: {message}",
        /// The referenced author does not exist.
        UnknownAuthor { author_id: String } =>
            "author {author_id} does not exist",
    }
}

/// Port for reading and extending the catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueRepository: Send + Sync {
    /// All authors ordered by name.
    async fn list_authors(&self) -> Result<Vec<Author>, CatalogueRepositoryError>;

    /// Look up one author.
    async fn find_author(&self, id: &AuthorId) -> Result<Option<Author>, CatalogueRepositoryError>;

    /// Insert a new listing.
    async fn create_artwork(&self, artwork: &Artwork) -> Result<(), CatalogueRepositoryError>;

    /// One artwork with author and owner details, regardless of availability.
    async fn find_artwork(
        &self,
        id: &ArtworkId,
    ) -> Result<Option<ArtworkSummary>, CatalogueRepositoryError>;

    /// Artworks still for sale, ordered by title then id.
    async fn list_available(&self) -> Result<Vec<ArtworkSummary>, CatalogueRepositoryError>;

    /// Artworks listed by `owner`, ordered by title then id.
    async fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<ArtworkSummary>, CatalogueRepositoryError>;

    /// Acquisitions made by `buyer` joined with artwork and author.
    async fn acquisitions_for(
        &self,
        buyer: &UserId,
    ) -> Result<Vec<OwnedAcquisition>, CatalogueRepositoryError>;
}
